//! Inventory transaction commands.

use chrono::{DateTime, Utc};
use common::{CargoId, SpacecraftId, StorageUnitId, UserId};
use serde::Deserialize;

use crate::references::{HasReferences, Reference, ReferenceList};

use super::TransactionType;

/// Command to record a new inventory transaction.
///
/// Fields arrive as shaped by the ingress layer; required ones may still be
/// absent and are reported when the transaction is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInventoryTransaction {
    pub transaction_type: Option<TransactionType>,
    pub cargo_id: Option<CargoId>,
    pub quantity: Option<i32>,
    pub from_storage_unit_id: Option<StorageUnitId>,
    pub to_storage_unit_id: Option<StorageUnitId>,
    pub from_spacecraft_id: Option<SpacecraftId>,
    pub to_spacecraft_id: Option<SpacecraftId>,
    pub performed_by_user_id: Option<UserId>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub reason_code: Option<String>,
    pub notes: Option<String>,
}

impl RecordInventoryTransaction {
    /// Creates a command with the required fields set.
    pub fn new(
        transaction_type: TransactionType,
        cargo_id: CargoId,
        quantity: i32,
        performed_by: UserId,
    ) -> Self {
        Self {
            transaction_type: Some(transaction_type),
            cargo_id: Some(cargo_id),
            quantity: Some(quantity),
            performed_by_user_id: Some(performed_by),
            ..Default::default()
        }
    }

    /// Creates a LOAD command; a target still has to be set.
    pub fn load(cargo_id: CargoId, quantity: i32, performed_by: UserId) -> Self {
        Self::new(TransactionType::Load, cargo_id, quantity, performed_by)
    }

    /// Creates an UNLOAD command; a source still has to be set.
    pub fn unload(cargo_id: CargoId, quantity: i32, performed_by: UserId) -> Self {
        Self::new(TransactionType::Unload, cargo_id, quantity, performed_by)
    }

    /// Creates a TRANSFER command; a source and a target still have to be set.
    pub fn transfer(cargo_id: CargoId, quantity: i32, performed_by: UserId) -> Self {
        Self::new(TransactionType::Transfer, cargo_id, quantity, performed_by)
    }

    pub fn from_storage_unit(mut self, id: StorageUnitId) -> Self {
        self.from_storage_unit_id = Some(id);
        self
    }

    pub fn to_storage_unit(mut self, id: StorageUnitId) -> Self {
        self.to_storage_unit_id = Some(id);
        self
    }

    pub fn from_spacecraft(mut self, id: SpacecraftId) -> Self {
        self.from_spacecraft_id = Some(id);
        self
    }

    pub fn to_spacecraft(mut self, id: SpacecraftId) -> Self {
        self.to_spacecraft_id = Some(id);
        self
    }

    /// Attaches a reason code and free-form notes.
    pub fn with_reason(mut self, reason_code: impl Into<String>, notes: Option<String>) -> Self {
        self.reason_code = Some(reason_code.into());
        self.notes = notes;
        self
    }
}

impl HasReferences for RecordInventoryTransaction {
    fn references(&self) -> Vec<Reference> {
        ReferenceList::default()
            .push("cargoId", self.cargo_id)
            .push("fromStorageUnitId", self.from_storage_unit_id)
            .push("toStorageUnitId", self.to_storage_unit_id)
            .push("fromSpacecraftId", self.from_spacecraft_id)
            .push("toSpacecraftId", self.to_spacecraft_id)
            .push("performedByUserId", self.performed_by_user_id)
            .into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::EntityRef;

    #[test]
    fn test_builder_sets_fields() {
        let cmd = RecordInventoryTransaction::transfer(CargoId::new(1), 3, UserId::new(2))
            .from_storage_unit(StorageUnitId::new(10))
            .to_spacecraft(SpacecraftId::new(20))
            .with_reason("RESTOCK", Some("weekly run".to_string()));

        assert_eq!(cmd.transaction_type, Some(TransactionType::Transfer));
        assert_eq!(cmd.from_storage_unit_id, Some(StorageUnitId::new(10)));
        assert_eq!(cmd.to_spacecraft_id, Some(SpacecraftId::new(20)));
        assert_eq!(cmd.reason_code.as_deref(), Some("RESTOCK"));
    }

    #[test]
    fn test_references_in_declaration_order() {
        let cmd = RecordInventoryTransaction::transfer(CargoId::new(1), 3, UserId::new(2))
            .to_spacecraft(SpacecraftId::new(20))
            .from_storage_unit(StorageUnitId::new(10));

        let fields: Vec<_> = cmd.references().iter().map(|r| r.field).collect();
        assert_eq!(
            fields,
            vec![
                "cargoId",
                "fromStorageUnitId",
                "toSpacecraftId",
                "performedByUserId"
            ]
        );
        assert_eq!(
            cmd.references()[2].target,
            EntityRef::Spacecraft(SpacecraftId::new(20))
        );
    }

    #[test]
    fn test_deserialize_from_wire_shape() {
        let cmd: RecordInventoryTransaction = serde_json::from_value(serde_json::json!({
            "transactionType": "LOAD",
            "cargoId": 42,
            "quantity": 5,
            "toStorageUnitId": 5,
            "performedByUserId": 1
        }))
        .unwrap();

        assert_eq!(cmd.transaction_type, Some(TransactionType::Load));
        assert_eq!(cmd.cargo_id, Some(CargoId::new(42)));
        assert!(cmd.from_storage_unit_id.is_none());
    }
}
