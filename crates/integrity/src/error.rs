//! Service error types.

use common::RecordId;
use domain::DomainError;
use record_store::StoreError;
use resilience::DependencyError;
use thiserror::Error;

use crate::validator::{FieldError, ReferenceError};

/// Errors returned by the application services.
///
/// Each variant maps to one kind of answer at the ingress boundary; the
/// mapping never merges `ReferencesNotFound` with `DependencyUnavailable`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The record violates a business rule; the caller can fix the request.
    #[error("{0}")]
    Validation(#[from] DomainError),

    /// One or more referenced entities do not exist in their owning service.
    #[error("Referenced entities not found: {}", describe(.0))]
    ReferencesNotFound(Vec<FieldError>),

    /// A local record addressed by id does not exist.
    #[error("{record_type} not found: {id}")]
    RecordNotFound {
        record_type: &'static str,
        id: RecordId,
    },

    /// A referenced entity could not be checked; retrying later may succeed.
    #[error("Cannot verify {field}: {source}")]
    DependencyUnavailable {
        field: &'static str,
        source: DependencyError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Name of the dependency that could not be reached, if that is the failure.
    pub fn unavailable_dependency(&self) -> Option<&str> {
        match self {
            ServiceError::DependencyUnavailable {
                source: DependencyError::Unavailable { dependency, .. },
                ..
            } => Some(dependency),
            _ => None,
        }
    }
}

impl From<ReferenceError> for ServiceError {
    fn from(err: ReferenceError) -> Self {
        match err {
            ReferenceError::NotFound(errors) => ServiceError::ReferencesNotFound(errors),
            ReferenceError::Unavailable { field, error } => ServiceError::DependencyUnavailable {
                field,
                source: error,
            },
        }
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
