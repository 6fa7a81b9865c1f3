//! Domain error types.

use thiserror::Error;

use crate::inventory::InventoryTransactionError;
use crate::manifest::CargoManifestError;

/// Invariant violations raised by any aggregate.
///
/// Every variant is caller-fixable: the request describes an impossible
/// record and must be corrected, not retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An inventory transaction rule was violated.
    #[error("Invalid inventory transaction: {0}")]
    InventoryTransaction(#[from] InventoryTransactionError),

    /// A cargo manifest rule was violated.
    #[error("Invalid cargo manifest: {0}")]
    CargoManifest(#[from] CargoManifestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_rule() {
        let err = DomainError::from(InventoryTransactionError::SameStorageUnit);
        assert_eq!(
            err.to_string(),
            "Invalid inventory transaction: TRANSFER transaction cannot have same storage unit as source and target"
        );

        let err = DomainError::from(CargoManifestError::UnloadingUserRequired);
        assert!(err.to_string().starts_with("Invalid cargo manifest:"));
    }
}
