//! Identifier types shared by every crate in the workspace.

pub mod types;

pub use types::{CargoId, EntityKind, RecordId, SpacecraftId, StorageUnitId, UserId};
