//! Inventory transaction service.

use chrono::Utc;
use common::RecordId;
use domain::{DomainError, InventoryTransaction, RecordInventoryTransaction};
use record_store::{Record, RecordStore, Stored};

use crate::error::{Result, ServiceError};
use crate::validator::ExistenceValidator;

/// Records inventory movements after checking what they point at.
///
/// Transactions are append-only: there is no update or delete.
pub struct InventoryTransactionService<S: RecordStore<InventoryTransaction>> {
    store: S,
    validator: ExistenceValidator,
}

impl<S: RecordStore<InventoryTransaction>> InventoryTransactionService<S> {
    pub fn new(store: S, validator: ExistenceValidator) -> Self {
        Self { store, validator }
    }

    pub fn validator(&self) -> &ExistenceValidator {
        &self.validator
    }

    /// Records a transaction.
    ///
    /// Referenced entities are confirmed first, then the transaction is built
    /// and its movement rules checked, then it is stored. Nothing is stored
    /// if any step fails.
    #[tracing::instrument(skip(self, cmd), fields(transaction_type = ?cmd.transaction_type))]
    pub async fn record(&self, cmd: RecordInventoryTransaction) -> Result<Stored<InventoryTransaction>> {
        self.validator.validate(&cmd).await?;

        let transaction =
            InventoryTransaction::record(&cmd, Utc::now()).map_err(DomainError::from)?;
        let stored = self.store.insert(transaction).await?;

        metrics::counter!(
            "inventory_transactions_recorded_total",
            "type" => stored.record.transaction_type.as_str()
        )
        .increment(1);
        tracing::info!(transaction_id = %stored.record.id, "inventory transaction recorded");

        Ok(stored)
    }

    /// Loads a transaction by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: RecordId) -> Result<Stored<InventoryTransaction>> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::RecordNotFound {
                record_type: InventoryTransaction::record_type(),
                id,
            })
    }

    /// Lists every transaction, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Stored<InventoryTransaction>>> {
        let mut transactions = self.store.find_all().await?;
        transactions.sort_by_key(|t| (t.record.occurred_at, t.created_at));
        Ok(transactions)
    }
}
