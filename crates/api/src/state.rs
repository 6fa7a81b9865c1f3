//! Shared application state and its wiring.

use std::sync::Arc;
use std::time::Duration;

use common::EntityKind;
use domain::{CargoManifest, InventoryTransaction};
use integrity::{
    CargoManifestService, ExistenceValidator, InventoryTransactionService, ServiceError,
};
use record_store::InMemoryRecordStore;
use resilience::{
    BreakerRegistry, CircuitState, ExistenceCheck, HttpLookup, ResilientClient, UnconfiguredLookup,
};

use crate::config::{Config, DependencyConfig};
use crate::error::{ApiError, StartupError};

pub type TransactionStore = InMemoryRecordStore<InventoryTransaction>;
pub type ManifestStore = InMemoryRecordStore<CargoManifest>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub inventory: InventoryTransactionService<TransactionStore>,
    pub manifests: CargoManifestService<ManifestStore>,
    pub breakers: Arc<BreakerRegistry>,
}

impl AppState {
    /// Creates state over fresh in-memory stores.
    pub fn new(validator: ExistenceValidator, breakers: Arc<BreakerRegistry>) -> Self {
        Self {
            inventory: InventoryTransactionService::new(TransactionStore::new(), validator.clone()),
            manifests: CargoManifestService::new(ManifestStore::new(), validator),
            breakers,
        }
    }

    /// Wires breakers and remote lookups from configuration.
    ///
    /// Dependencies with a URL are reached over HTTP. A dependency without
    /// one answers every check as unavailable; its references are never
    /// reported missing.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let mut registry = BreakerRegistry::new(config.breaker.clone())?;
        for dependency in &config.dependencies {
            registry = registry.with_config(dependency.name.clone(), dependency.breaker.clone())?;
        }

        let check = |kind: EntityKind| -> Result<Arc<dyn ExistenceCheck>, StartupError> {
            match config.dependencies.iter().find(|d| d.kind == kind) {
                Some(dependency) => existence_check(dependency, &registry),
                None => Err(StartupError::MissingDependency(kind)),
            }
        };

        let validator = ExistenceValidator::new(
            check(EntityKind::Cargo)?,
            check(EntityKind::StorageUnit)?,
            check(EntityKind::Spacecraft)?,
            check(EntityKind::User)?,
        );

        Ok(Self::new(validator, Arc::new(registry)))
    }

    /// Converts a service error, attaching a retry hint when a dependency is down.
    pub fn api_error(&self, err: ServiceError) -> ApiError {
        let Some(dependency) = err.unavailable_dependency() else {
            return ApiError::Service(err);
        };

        let retry_after = self
            .breakers
            .state(dependency)
            .filter(|snapshot| snapshot.state == CircuitState::Open)
            .map(|snapshot| Duration::from_millis(snapshot.current_wait_duration_ms))
            .unwrap_or(Duration::from_secs(1));

        ApiError::Unavailable {
            error: err,
            retry_after,
        }
    }
}

fn existence_check(
    dependency: &DependencyConfig,
    registry: &BreakerRegistry,
) -> Result<Arc<dyn ExistenceCheck>, StartupError> {
    match &dependency.url {
        Some(url) => {
            let lookup = HttpLookup::<serde_json::Value>::new(url.as_str(), dependency.timeout)
                .map_err(|source| StartupError::Lookup {
                    dependency: dependency.name.clone(),
                    source,
                })?;
            tracing::info!(dependency = %dependency.name, %url, "using HTTP lookup");
            Ok(Arc::new(
                ResilientClient::new(dependency.name.as_str(), dependency.kind, lookup, registry)
                    .with_timeout(dependency.timeout),
            ))
        }
        None => {
            tracing::warn!(
                dependency = %dependency.name,
                "no URL configured, references to this dependency will be reported unavailable"
            );
            Ok(Arc::new(
                ResilientClient::new(
                    dependency.name.as_str(),
                    dependency.kind,
                    UnconfiguredLookup::<()>::new(dependency.name.as_str()),
                    registry,
                )
                .with_timeout(dependency.timeout),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use common::{CargoId, StorageUnitId, UserId};
    use domain::{RecordInventoryTransaction, TransactionType};
    use resilience::{CallFailure, DependencyError, LookupError};

    use super::*;

    fn load() -> RecordInventoryTransaction {
        RecordInventoryTransaction {
            transaction_type: Some(TransactionType::Load),
            cargo_id: Some(CargoId::new(42)),
            quantity: Some(10),
            to_storage_unit_id: Some(StorageUnitId::new(5)),
            performed_by_user_id: Some(UserId::new(7)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unwired_dependency_is_unavailable_not_missing() {
        let state = AppState::from_config(&Config::default()).unwrap();

        let err = state.inventory.record(load()).await.unwrap_err();

        match &err {
            ServiceError::DependencyUnavailable {
                field,
                source:
                    DependencyError::Unavailable {
                        dependency,
                        reason: CallFailure::Lookup(LookupError::Unconfigured(_)),
                    },
            } => {
                assert_eq!(*field, "cargoId");
                assert_eq!(dependency, "cargo-service");
            }
            other => panic!("expected an unavailable dependency, got {other:?}"),
        }
        assert!(matches!(state.api_error(err), ApiError::Unavailable { .. }));
        assert!(state.inventory.list().await.unwrap().is_empty());
    }
}
