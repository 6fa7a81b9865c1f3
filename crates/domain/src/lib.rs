//! Domain layer for the cross-service integrity core.
//!
//! This crate provides:
//! - The [`Aggregate`] trait: records that can check their own consistency
//! - The inventory transaction aggregate and its movement rules
//! - The cargo manifest aggregate and its status rules
//! - Commands and the foreign references they carry
//!
//! Nothing here performs I/O; checking that referenced entities exist in
//! other services is the job of the `integrity` crate.

pub mod aggregate;
pub mod error;
pub mod inventory;
pub mod manifest;
pub mod references;

pub use aggregate::Aggregate;
pub use error::DomainError;
pub use inventory::{
    InventoryTransaction, InventoryTransactionError, RecordInventoryTransaction, TransactionType,
};
pub use manifest::{
    CargoManifest, CargoManifestError, CreateCargoManifest, ManifestPriority, ManifestStatus,
    UpdateCargoManifest,
};
pub use references::{EntityRef, HasReferences, Reference};
