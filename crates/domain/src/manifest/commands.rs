//! Cargo manifest commands.

use chrono::{DateTime, Utc};
use common::{CargoId, SpacecraftId, StorageUnitId, UserId};
use serde::Deserialize;

use crate::references::{HasReferences, Reference, ReferenceList};

use super::{ManifestPriority, ManifestStatus};

/// Command to declare a new cargo manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCargoManifest {
    pub spacecraft_id: Option<SpacecraftId>,
    pub cargo_id: Option<CargoId>,
    pub storage_unit_id: Option<StorageUnitId>,
    pub quantity: Option<i32>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub unloaded_at: Option<DateTime<Utc>>,
    pub loaded_by_user_id: Option<UserId>,
    pub unloaded_by_user_id: Option<UserId>,
    pub status: Option<ManifestStatus>,
    pub priority: Option<ManifestPriority>,
}

impl CreateCargoManifest {
    /// Creates a command with the required fields set.
    pub fn new(
        spacecraft_id: SpacecraftId,
        cargo_id: CargoId,
        storage_unit_id: StorageUnitId,
        quantity: i32,
        loaded_by: UserId,
    ) -> Self {
        Self {
            spacecraft_id: Some(spacecraft_id),
            cargo_id: Some(cargo_id),
            storage_unit_id: Some(storage_unit_id),
            quantity: Some(quantity),
            loaded_by_user_id: Some(loaded_by),
            ..Default::default()
        }
    }

    /// Marks the load as already aboard at `loaded_at`.
    pub fn loaded(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.status = Some(ManifestStatus::Loaded);
        self.loaded_at = Some(loaded_at);
        self
    }

    pub fn with_priority(mut self, priority: ManifestPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl HasReferences for CreateCargoManifest {
    fn references(&self) -> Vec<Reference> {
        ReferenceList::default()
            .push("spacecraftId", self.spacecraft_id)
            .push("cargoId", self.cargo_id)
            .push("storageUnitId", self.storage_unit_id)
            .push("loadedByUserId", self.loaded_by_user_id)
            .push("unloadedByUserId", self.unloaded_by_user_id)
            .into_vec()
    }
}

/// Command to change an existing manifest.
///
/// Only present fields are applied; there is no way to clear a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCargoManifest {
    pub spacecraft_id: Option<SpacecraftId>,
    pub cargo_id: Option<CargoId>,
    pub storage_unit_id: Option<StorageUnitId>,
    pub quantity: Option<i32>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub unloaded_at: Option<DateTime<Utc>>,
    pub loaded_by_user_id: Option<UserId>,
    pub unloaded_by_user_id: Option<UserId>,
    pub status: Option<ManifestStatus>,
    pub priority: Option<ManifestPriority>,
}

impl UpdateCargoManifest {
    /// Moves the manifest to UNLOADED, recording who unloaded it and when.
    pub fn unload(unloaded_by: UserId, unloaded_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(ManifestStatus::Unloaded),
            unloaded_by_user_id: Some(unloaded_by),
            unloaded_at: Some(unloaded_at),
            ..Default::default()
        }
    }

    /// Moves the manifest to `status` without touching anything else.
    pub fn status(status: ManifestStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl HasReferences for UpdateCargoManifest {
    fn references(&self) -> Vec<Reference> {
        ReferenceList::default()
            .push("spacecraftId", self.spacecraft_id)
            .push("cargoId", self.cargo_id)
            .push("storageUnitId", self.storage_unit_id)
            .push("loadedByUserId", self.loaded_by_user_id)
            .push("unloadedByUserId", self.unloaded_by_user_id)
            .into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_references_in_declaration_order() {
        let cmd = CreateCargoManifest::new(
            SpacecraftId::new(1),
            CargoId::new(2),
            StorageUnitId::new(3),
            5,
            UserId::new(4),
        );
        let fields: Vec<_> = cmd.references().iter().map(|r| r.field).collect();
        assert_eq!(
            fields,
            vec!["spacecraftId", "cargoId", "storageUnitId", "loadedByUserId"]
        );
    }

    #[test]
    fn test_update_references_only_present_fields() {
        let cmd = UpdateCargoManifest::unload(UserId::new(8), Utc::now());
        let refs = cmd.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].field, "unloadedByUserId");
    }

    #[test]
    fn test_update_status_only() {
        let cmd = UpdateCargoManifest::status(ManifestStatus::InTransit);
        assert_eq!(cmd.status, Some(ManifestStatus::InTransit));
        assert!(cmd.references().is_empty());
    }

    #[test]
    fn test_deserialize_update() {
        let cmd: UpdateCargoManifest = serde_json::from_value(serde_json::json!({
            "status": "UNLOADED",
            "unloadedByUserId": 3,
            "unloadedAt": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(cmd.status, Some(ManifestStatus::Unloaded));
        assert_eq!(cmd.unloaded_by_user_id, Some(UserId::new(3)));
        assert!(cmd.unloaded_at.is_some());
    }
}
