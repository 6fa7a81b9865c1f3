//! Cargo manifest aggregate and related types.

mod aggregate;
mod commands;
mod status;

pub use aggregate::CargoManifest;
pub use commands::{CreateCargoManifest, UpdateCargoManifest};
pub use status::{ManifestPriority, ManifestStatus};

use thiserror::Error;

/// Errors raised while building or validating a cargo manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CargoManifestError {
    /// A required field was not supplied.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// Quantity must be strictly positive.
    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: i32 },

    #[error("Unloading user is required when status is UNLOADED")]
    UnloadingUserRequired,

    #[error("Unloaded-at timestamp is required when status is UNLOADED")]
    UnloadedAtRequired,

    /// An unloading user only makes sense once the cargo is unloaded.
    #[error("Unloading user can only be set when status is UNLOADED, status is {status}")]
    UnloadingUserWithoutUnloadedStatus { status: ManifestStatus },

    #[error("Loaded-at timestamp is required when status is {status}")]
    LoadedAtRequired { status: ManifestStatus },

    #[error("Unloaded-at cannot be before loaded-at")]
    UnloadedBeforeLoaded,
}
