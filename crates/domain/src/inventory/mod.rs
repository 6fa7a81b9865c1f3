//! Inventory transaction aggregate and related types.

mod commands;
mod transaction;

pub use commands::RecordInventoryTransaction;
pub use transaction::{InventoryTransaction, TransactionType};

use thiserror::Error;

/// Errors raised while building or validating an inventory transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryTransactionError {
    /// A required field was not supplied.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// Quantity must be strictly positive.
    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: i32 },

    #[error("LOAD transaction requires a target storage unit or spacecraft")]
    LoadTargetMissing,

    #[error("LOAD transaction cannot have both storage unit and spacecraft as target")]
    LoadTargetAmbiguous,

    #[error("UNLOAD transaction requires a source storage unit or spacecraft")]
    UnloadSourceMissing,

    #[error("UNLOAD transaction cannot have both storage unit and spacecraft as source")]
    UnloadSourceAmbiguous,

    #[error("TRANSFER transaction requires a source storage unit or spacecraft")]
    TransferSourceMissing,

    #[error("TRANSFER transaction requires a target storage unit or spacecraft")]
    TransferTargetMissing,

    #[error("TRANSFER transaction cannot have same storage unit as source and target")]
    SameStorageUnit,

    #[error("TRANSFER transaction cannot have same spacecraft as source and target")]
    SameSpacecraft,

    /// ADJUSTMENT and CONSUMPTION must name where the stock is taken from.
    #[error("{transaction_type} transaction requires a source storage unit or spacecraft")]
    SourceRequired { transaction_type: TransactionType },
}
