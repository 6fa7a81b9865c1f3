use async_trait::async_trait;

use crate::{Record, RecordId, Result, Stored, Version};

/// Save/find contract for records owned by the local service.
///
/// All implementations must be thread-safe (Send + Sync). Nothing in this
/// contract coordinates with other services: a record written here may point
/// at a remote entity that has since been deleted.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Stores a new record at version 1.
    ///
    /// Fails with `AlreadyExists` if a record with the same ID is stored.
    async fn insert(&self, record: R) -> Result<Stored<R>>;

    /// Replaces a stored record.
    ///
    /// Fails with `ConcurrencyConflict` if the stored version is not
    /// `expected`, and with `NotFound` if there is nothing to replace.
    async fn update(&self, record: R, expected: Version) -> Result<Stored<R>>;

    /// Loads a record by ID.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Stored<R>>>;

    /// Loads every record, oldest first.
    async fn find_all(&self) -> Result<Vec<Stored<R>>>;
}
