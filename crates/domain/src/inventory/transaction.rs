//! Inventory transaction aggregate implementation.

use chrono::{DateTime, Utc};
use common::{CargoId, RecordId, SpacecraftId, StorageUnitId, UserId};
use record_store::Record;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{InventoryTransactionError, RecordInventoryTransaction};

/// What physical movement an inventory transaction describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Stock arrives at a storage unit or spacecraft.
    Load,
    /// Stock leaves a storage unit or spacecraft.
    Unload,
    /// Stock moves from one holder to another.
    Transfer,
    /// Stock level is corrected at a holder.
    Adjustment,
    /// Stock is used up at a holder.
    Consumption,
}

impl TransactionType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Load => "LOAD",
            TransactionType::Unload => "UNLOAD",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Adjustment => "ADJUSTMENT",
            TransactionType::Consumption => "CONSUMPTION",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An append-only record of stock moving between holders.
///
/// A holder is either a storage unit or a spacecraft; every foreign key here
/// points at an entity owned by another service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: RecordId,
    pub transaction_type: TransactionType,
    pub cargo_id: CargoId,
    pub quantity: i32,
    pub from_storage_unit_id: Option<StorageUnitId>,
    pub to_storage_unit_id: Option<StorageUnitId>,
    pub from_spacecraft_id: Option<SpacecraftId>,
    pub to_spacecraft_id: Option<SpacecraftId>,
    pub performed_by_user_id: UserId,
    pub occurred_at: DateTime<Utc>,
    pub reason_code: Option<String>,
    pub notes: Option<String>,
}

impl InventoryTransaction {
    /// Builds a transaction from a command and checks its invariants.
    ///
    /// Missing required fields are reported first, then the rules of
    /// [`Aggregate::validate`]. `now` is used when the command carries no
    /// timestamp.
    pub fn record(
        cmd: &RecordInventoryTransaction,
        now: DateTime<Utc>,
    ) -> Result<Self, InventoryTransactionError> {
        let transaction_type = required(cmd.transaction_type, "transactionType")?;
        let cargo_id = required(cmd.cargo_id, "cargoId")?;
        let quantity = required(cmd.quantity, "quantity")?;
        let performed_by_user_id = required(cmd.performed_by_user_id, "performedByUserId")?;

        let transaction = Self {
            id: RecordId::new(),
            transaction_type,
            cargo_id,
            quantity,
            from_storage_unit_id: cmd.from_storage_unit_id,
            to_storage_unit_id: cmd.to_storage_unit_id,
            from_spacecraft_id: cmd.from_spacecraft_id,
            to_spacecraft_id: cmd.to_spacecraft_id,
            performed_by_user_id,
            occurred_at: cmd.occurred_at.unwrap_or(now),
            reason_code: cmd.reason_code.clone(),
            notes: cmd.notes.clone(),
        };

        transaction.validate()?;
        Ok(transaction)
    }

    /// Returns true if a source holder is set.
    pub fn has_source(&self) -> bool {
        self.from_storage_unit_id.is_some() || self.from_spacecraft_id.is_some()
    }

    /// Returns true if a target holder is set.
    pub fn has_target(&self) -> bool {
        self.to_storage_unit_id.is_some() || self.to_spacecraft_id.is_some()
    }

    fn validate_load(&self) -> Result<(), InventoryTransactionError> {
        match (self.to_storage_unit_id, self.to_spacecraft_id) {
            (Some(_), Some(_)) => Err(InventoryTransactionError::LoadTargetAmbiguous),
            (None, None) => Err(InventoryTransactionError::LoadTargetMissing),
            _ => Ok(()),
        }
    }

    fn validate_unload(&self) -> Result<(), InventoryTransactionError> {
        match (self.from_storage_unit_id, self.from_spacecraft_id) {
            (Some(_), Some(_)) => Err(InventoryTransactionError::UnloadSourceAmbiguous),
            (None, None) => Err(InventoryTransactionError::UnloadSourceMissing),
            _ => Ok(()),
        }
    }

    fn validate_transfer(&self) -> Result<(), InventoryTransactionError> {
        if !self.has_source() {
            return Err(InventoryTransactionError::TransferSourceMissing);
        }
        if !self.has_target() {
            return Err(InventoryTransactionError::TransferTargetMissing);
        }
        if let (Some(from), Some(to)) = (self.from_storage_unit_id, self.to_storage_unit_id)
            && from == to
        {
            return Err(InventoryTransactionError::SameStorageUnit);
        }
        if let (Some(from), Some(to)) = (self.from_spacecraft_id, self.to_spacecraft_id)
            && from == to
        {
            return Err(InventoryTransactionError::SameSpacecraft);
        }
        Ok(())
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, InventoryTransactionError> {
    value.ok_or(InventoryTransactionError::MissingField { field })
}

impl Record for InventoryTransaction {
    fn record_type() -> &'static str {
        "InventoryTransaction"
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Aggregate for InventoryTransaction {
    type Error = InventoryTransactionError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.quantity <= 0 {
            return Err(InventoryTransactionError::InvalidQuantity {
                quantity: self.quantity,
            });
        }

        match self.transaction_type {
            TransactionType::Load => self.validate_load(),
            TransactionType::Unload => self.validate_unload(),
            TransactionType::Transfer => self.validate_transfer(),
            TransactionType::Adjustment | TransactionType::Consumption => {
                if self.has_source() {
                    Ok(())
                } else {
                    Err(InventoryTransactionError::SourceRequired {
                        transaction_type: self.transaction_type,
                    })
                }
            }
        }
    }
}
