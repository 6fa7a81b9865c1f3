//! Error types for breakers, lookups and dependency calls.

use std::time::Duration;

use common::EntityKind;
use thiserror::Error;

/// A breaker configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid breaker setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A failure raised by a remote lookup adapter.
///
/// Absence of an entity is not an error; adapters report it as `Ok(None)`
/// or `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with a status that is neither success nor absence.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The remote answered but the body could not be read.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// No endpoint was configured for the dependency.
    #[error("no endpoint configured for {0}")]
    Unconfigured(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            LookupError::UnexpectedStatus(status.as_u16())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

/// Why a dependency call produced no answer.
///
/// This is the input to a client's fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    /// The circuit breaker refused the call; nothing was sent.
    #[error("circuit breaker is open")]
    Rejected,

    #[error("call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The task running the call panicked or was cancelled by the runtime.
    #[error("call aborted")]
    Aborted,
}

/// Typed result of a failed dependency call, as seen by callers.
///
/// `NotFound` is only ever produced from a genuine absence answer, and
/// `Unavailable` only from a rejected, failed or timed-out call; the two are
/// never converted into each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("{entity} not found with id: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("{dependency} is unavailable: {reason}")]
    Unavailable {
        dependency: String,
        reason: CallFailure,
    },
}

impl DependencyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DependencyError::NotFound { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, DependencyError::Unavailable { .. })
    }
}
