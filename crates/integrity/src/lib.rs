//! Referential integrity across service boundaries.
//!
//! Before a command may change local state, every entity it references in
//! another service is confirmed through the [`ExistenceValidator`]. Only then
//! is the aggregate built, its invariants checked and the result stored.
//!
//! ```text
//! command ─► ExistenceValidator ─► aggregate construction ─► invariants ─► RecordStore
//!                  │
//!                  └─► ResilientClient ─► CircuitBreaker ─► RemoteLookup
//! ```

pub mod error;
pub mod inventory;
pub mod manifest;
pub mod validator;

pub use error::{Result, ServiceError};
pub use inventory::InventoryTransactionService;
pub use manifest::CargoManifestService;
pub use validator::{ExistenceValidator, FieldError, NotFoundPolicy, ReferenceError};
