//! Cargo manifest aggregate implementation.

use chrono::{DateTime, Utc};
use common::{CargoId, RecordId, SpacecraftId, StorageUnitId, UserId};
use record_store::Record;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    CargoManifestError, CreateCargoManifest, ManifestPriority, ManifestStatus, UpdateCargoManifest,
};

/// A load of cargo declared against a spacecraft.
///
/// The status rules are implications over the record's own fields:
/// ```text
/// status == UNLOADED  <=>  unloaded_by_user_id is set
/// status == UNLOADED   =>  unloaded_at is set
/// status in {LOADED, IN_TRANSIT} => loaded_at is set
/// unloaded_at >= loaded_at when both are set
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoManifest {
    pub id: RecordId,
    pub spacecraft_id: SpacecraftId,
    pub cargo_id: CargoId,
    pub storage_unit_id: StorageUnitId,
    pub quantity: i32,
    pub loaded_at: Option<DateTime<Utc>>,
    pub unloaded_at: Option<DateTime<Utc>>,
    pub loaded_by_user_id: UserId,
    pub unloaded_by_user_id: Option<UserId>,
    pub status: ManifestStatus,
    pub priority: ManifestPriority,
}

impl CargoManifest {
    /// Builds a manifest from a create command and checks its invariants.
    ///
    /// Status defaults to PENDING and priority to NORMAL when absent.
    pub fn create(cmd: &CreateCargoManifest) -> Result<Self, CargoManifestError> {
        let manifest = Self {
            id: RecordId::new(),
            spacecraft_id: required(cmd.spacecraft_id, "spacecraftId")?,
            cargo_id: required(cmd.cargo_id, "cargoId")?,
            storage_unit_id: required(cmd.storage_unit_id, "storageUnitId")?,
            quantity: required(cmd.quantity, "quantity")?,
            loaded_at: cmd.loaded_at,
            unloaded_at: cmd.unloaded_at,
            loaded_by_user_id: required(cmd.loaded_by_user_id, "loadedByUserId")?,
            unloaded_by_user_id: cmd.unloaded_by_user_id,
            status: cmd.status.unwrap_or_default(),
            priority: cmd.priority.unwrap_or_default(),
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Returns the manifest with every field present on `cmd` replaced.
    ///
    /// Absent fields keep their current value. The result is validated as a
    /// whole; the previous status is not consulted.
    pub fn updated(&self, cmd: &UpdateCargoManifest) -> Result<Self, CargoManifestError> {
        let manifest = Self {
            id: self.id,
            spacecraft_id: cmd.spacecraft_id.unwrap_or(self.spacecraft_id),
            cargo_id: cmd.cargo_id.unwrap_or(self.cargo_id),
            storage_unit_id: cmd.storage_unit_id.unwrap_or(self.storage_unit_id),
            quantity: cmd.quantity.unwrap_or(self.quantity),
            loaded_at: cmd.loaded_at.or(self.loaded_at),
            unloaded_at: cmd.unloaded_at.or(self.unloaded_at),
            loaded_by_user_id: cmd.loaded_by_user_id.unwrap_or(self.loaded_by_user_id),
            unloaded_by_user_id: cmd.unloaded_by_user_id.or(self.unloaded_by_user_id),
            status: cmd.status.unwrap_or(self.status),
            priority: cmd.priority.unwrap_or(self.priority),
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Returns true if the cargo has been taken off the spacecraft.
    pub fn is_unloaded(&self) -> bool {
        self.status == ManifestStatus::Unloaded
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, CargoManifestError> {
    value.ok_or(CargoManifestError::MissingField { field })
}

impl Record for CargoManifest {
    fn record_type() -> &'static str {
        "CargoManifest"
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Aggregate for CargoManifest {
    type Error = CargoManifestError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.quantity <= 0 {
            return Err(CargoManifestError::InvalidQuantity {
                quantity: self.quantity,
            });
        }

        if self.is_unloaded() {
            if self.unloaded_by_user_id.is_none() {
                return Err(CargoManifestError::UnloadingUserRequired);
            }
            if self.unloaded_at.is_none() {
                return Err(CargoManifestError::UnloadedAtRequired);
            }
        } else if self.unloaded_by_user_id.is_some() {
            return Err(CargoManifestError::UnloadingUserWithoutUnloadedStatus {
                status: self.status,
            });
        }

        if self.status.is_aboard() && self.loaded_at.is_none() {
            return Err(CargoManifestError::LoadedAtRequired {
                status: self.status,
            });
        }

        if let (Some(loaded), Some(unloaded)) = (self.loaded_at, self.unloaded_at)
            && unloaded < loaded
        {
            return Err(CargoManifestError::UnloadedBeforeLoaded);
        }

        Ok(())
    }
}
