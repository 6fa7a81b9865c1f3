use thiserror::Error;

use crate::{RecordId, Version};

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same ID is already stored.
    #[error("{record_type} {record_id} already exists")]
    AlreadyExists {
        record_type: &'static str,
        record_id: RecordId,
    },

    /// The record was not found.
    #[error("{record_type} {record_id} not found")]
    NotFound {
        record_type: &'static str,
        record_id: RecordId,
    },

    /// The stored version did not match the version the caller read.
    #[error(
        "Concurrency conflict for {record_type} {record_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        record_type: &'static str,
        record_id: RecordId,
        expected: Version,
        actual: Version,
    },

    /// The backing store could not be reached.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
