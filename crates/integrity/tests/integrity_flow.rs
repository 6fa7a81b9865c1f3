//! End-to-end flows through the services with in-memory dependencies.

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{CargoId, EntityKind, RecordId, SpacecraftId, StorageUnitId, UserId};
use domain::{
    CargoManifest, CargoManifestError, CreateCargoManifest, DomainError, InventoryTransaction,
    InventoryTransactionError, ManifestPriority, ManifestStatus, RecordInventoryTransaction,
    TransactionType, UpdateCargoManifest,
};
use integrity::{
    CargoManifestService, ExistenceValidator, InventoryTransactionService, ServiceError,
};
use record_store::{InMemoryRecordStore, StoreError, Version};
use resilience::{
    BreakerRegistry, CircuitState, ExistenceCheck, InMemoryLookup, ResilientClient,
};

struct Harness {
    registry: BreakerRegistry,
    cargo: InMemoryLookup<()>,
    storage_units: InMemoryLookup<()>,
    spacecraft: InMemoryLookup<()>,
    users: InMemoryLookup<()>,
}

impl Harness {
    fn new() -> Self {
        let harness = Self {
            registry: BreakerRegistry::default(),
            cargo: InMemoryLookup::new(),
            storage_units: InMemoryLookup::new(),
            spacecraft: InMemoryLookup::new(),
            users: InMemoryLookup::new(),
        };
        for id in [1, 42] {
            harness.cargo.insert(id, ());
        }
        for id in [3, 5] {
            harness.storage_units.insert(id, ());
        }
        harness.spacecraft.insert(9, ());
        for id in [2, 7] {
            harness.users.insert(id, ());
        }
        harness
    }

    fn validator(&self) -> ExistenceValidator {
        fn check(
            registry: &BreakerRegistry,
            name: &str,
            kind: EntityKind,
            lookup: &InMemoryLookup<()>,
        ) -> Arc<dyn ExistenceCheck> {
            Arc::new(ResilientClient::new(name, kind, lookup.clone(), registry))
        }

        ExistenceValidator::new(
            check(&self.registry, "cargo-service", EntityKind::Cargo, &self.cargo),
            check(
                &self.registry,
                "storage-unit-service",
                EntityKind::StorageUnit,
                &self.storage_units,
            ),
            check(
                &self.registry,
                "spacecraft-service",
                EntityKind::Spacecraft,
                &self.spacecraft,
            ),
            check(&self.registry, "user-service", EntityKind::User, &self.users),
        )
    }

    fn inventory(
        &self,
    ) -> (
        InventoryTransactionService<InMemoryRecordStore<InventoryTransaction>>,
        InMemoryRecordStore<InventoryTransaction>,
    ) {
        let store = InMemoryRecordStore::new();
        (
            InventoryTransactionService::new(store.clone(), self.validator()),
            store,
        )
    }

    fn manifests(&self) -> CargoManifestService<InMemoryRecordStore<CargoManifest>> {
        CargoManifestService::new(InMemoryRecordStore::new(), self.validator())
    }
}

#[tokio::test]
async fn test_record_valid_transfer() {
    let harness = Harness::new();
    let (service, store) = harness.inventory();

    let cmd = RecordInventoryTransaction::transfer(CargoId::new(42), 10, UserId::new(2))
        .from_storage_unit(StorageUnitId::new(3))
        .to_spacecraft(SpacecraftId::new(9));

    let stored = service.record(cmd).await.unwrap();
    assert_eq!(stored.version, Version::first());
    assert_eq!(stored.record.transaction_type, TransactionType::Transfer);
    assert_eq!(store.record_count().await, 1);

    let loaded = service.get(stored.record.id).await.unwrap();
    assert_eq!(loaded.record, stored.record);
}

#[tokio::test]
async fn test_invariant_violation_is_not_stored() {
    let harness = Harness::new();
    let (service, store) = harness.inventory();

    let cmd = RecordInventoryTransaction::load(CargoId::new(42), 10, UserId::new(2))
        .to_storage_unit(StorageUnitId::new(5))
        .to_spacecraft(SpacecraftId::new(9));

    let err = service.record(cmd).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(DomainError::InventoryTransaction(
            InventoryTransactionError::LoadTargetAmbiguous
        ))
    ));
    assert!(
        err.to_string()
            .contains("cannot have both storage unit and spacecraft as target")
    );
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn test_missing_reference_is_reported_by_field() {
    let harness = Harness::new();
    let (service, store) = harness.inventory();

    let cmd = RecordInventoryTransaction::unload(CargoId::new(404), 1, UserId::new(2))
        .from_spacecraft(SpacecraftId::new(9));

    match service.record(cmd).await.unwrap_err() {
        ServiceError::ReferencesNotFound(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "cargoId");
            assert_eq!(errors[0].id, 404);
        }
        other => panic!("expected ReferencesNotFound, got {other:?}"),
    }
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn test_unreachable_dependency_is_distinct_from_not_found() {
    let harness = Harness::new();
    let (service, store) = harness.inventory();
    harness.users.set_failing(true);

    let cmd = RecordInventoryTransaction::load(CargoId::new(42), 1, UserId::new(2))
        .to_storage_unit(StorageUnitId::new(3));

    let err = service.record(cmd).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::DependencyUnavailable {
            field: "performedByUserId",
            ..
        }
    ));
    assert_eq!(err.unavailable_dependency(), Some("user-service"));
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn test_open_breaker_short_circuits_cargo_checks() {
    let harness = Harness::new();
    let (service, _) = harness.inventory();
    harness.cargo.set_failing(true);

    for _ in 0..5 {
        let cmd = RecordInventoryTransaction::load(CargoId::new(42), 1, UserId::new(2))
            .to_storage_unit(StorageUnitId::new(3));
        assert!(service.record(cmd).await.is_err());
    }
    assert_eq!(
        harness.registry.state("cargo-service").unwrap().state,
        CircuitState::Open
    );

    let calls = harness.cargo.call_count();
    let cmd = RecordInventoryTransaction::load(CargoId::new(42), 1, UserId::new(2))
        .to_storage_unit(StorageUnitId::new(3));
    let err = service.record(cmd).await.unwrap_err();

    assert_eq!(err.unavailable_dependency(), Some("cargo-service"));
    assert_eq!(harness.cargo.call_count(), calls);
}

#[tokio::test]
async fn test_list_transactions() {
    let harness = Harness::new();
    let (service, _) = harness.inventory();

    for quantity in [1, 2, 3] {
        let cmd = RecordInventoryTransaction::new(
            TransactionType::Consumption,
            CargoId::new(1),
            quantity,
            UserId::new(7),
        )
        .from_spacecraft(SpacecraftId::new(9));
        service.record(cmd).await.unwrap();
    }

    let listed = service.list().await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn test_get_unknown_transaction() {
    let harness = Harness::new();
    let (service, _) = harness.inventory();

    let id = RecordId::new();
    assert!(matches!(
        service.get(id).await,
        Err(ServiceError::RecordNotFound { record_type: "InventoryTransaction", id: missing }) if missing == id
    ));
}

#[tokio::test]
async fn test_manifest_journey() {
    let harness = Harness::new();
    let service = harness.manifests();
    let loaded_at = Utc::now() - Duration::hours(2);

    let cmd = CreateCargoManifest::new(
        SpacecraftId::new(9),
        CargoId::new(42),
        StorageUnitId::new(3),
        12,
        UserId::new(2),
    )
    .loaded(loaded_at)
    .with_priority(ManifestPriority::High);

    let created = service.create(cmd).await.unwrap();
    assert_eq!(created.record.status, ManifestStatus::Loaded);
    let id = created.record.id;

    let in_transit = service
        .update(id, UpdateCargoManifest::status(ManifestStatus::InTransit), None)
        .await
        .unwrap();
    assert_eq!(in_transit.version, Version::new(2));

    let unloaded = service
        .update(
            id,
            UpdateCargoManifest::unload(UserId::new(7), Utc::now()),
            Some(in_transit.version),
        )
        .await
        .unwrap();
    assert!(unloaded.record.is_unloaded());
    assert_eq!(unloaded.record.unloaded_by_user_id, Some(UserId::new(7)));
}

#[tokio::test]
async fn test_manifest_unloaded_without_user_is_rejected() {
    let harness = Harness::new();
    let service = harness.manifests();

    let created = service
        .create(CreateCargoManifest::new(
            SpacecraftId::new(9),
            CargoId::new(42),
            StorageUnitId::new(3),
            1,
            UserId::new(2),
        ))
        .await
        .unwrap();

    let err = service
        .update(
            created.record.id,
            UpdateCargoManifest::status(ManifestStatus::Unloaded),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(DomainError::CargoManifest(
            CargoManifestError::UnloadingUserRequired
        ))
    ));
    let current = service.get(created.record.id).await.unwrap();
    assert_eq!(current.record.status, ManifestStatus::Pending);
}

#[tokio::test]
async fn test_manifest_stale_version_conflicts() {
    let harness = Harness::new();
    let service = harness.manifests();

    let created = service
        .create(
            CreateCargoManifest::new(
                SpacecraftId::new(9),
                CargoId::new(1),
                StorageUnitId::new(5),
                4,
                UserId::new(2),
            )
            .loaded(Utc::now()),
        )
        .await
        .unwrap();
    let id = created.record.id;

    service
        .update(
            id,
            UpdateCargoManifest::status(ManifestStatus::InTransit),
            Some(created.version),
        )
        .await
        .unwrap();

    let err = service
        .update(
            id,
            UpdateCargoManifest::status(ManifestStatus::Loaded),
            Some(created.version),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Store(StoreError::ConcurrencyConflict { .. })
    ));
}

#[tokio::test]
async fn test_manifest_update_checks_new_references() {
    let harness = Harness::new();
    let service = harness.manifests();

    let created = service
        .create(CreateCargoManifest::new(
            SpacecraftId::new(9),
            CargoId::new(1),
            StorageUnitId::new(5),
            4,
            UserId::new(2),
        ))
        .await
        .unwrap();

    let update = UpdateCargoManifest {
        storage_unit_id: Some(StorageUnitId::new(77)),
        ..Default::default()
    };
    match service.update(created.record.id, update, None).await {
        Err(ServiceError::ReferencesNotFound(errors)) => {
            assert_eq!(errors[0].field, "storageUnitId");
        }
        other => panic!("expected ReferencesNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_unknown_manifest() {
    let harness = Harness::new();
    let service = harness.manifests();

    let err = service
        .update(
            RecordId::new(),
            UpdateCargoManifest::status(ManifestStatus::InTransit),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::RecordNotFound {
            record_type: "CargoManifest",
            ..
        }
    ));
}

#[tokio::test]
async fn test_manifests_listed_by_priority() {
    let harness = Harness::new();
    let service = harness.manifests();

    for priority in [
        ManifestPriority::Normal,
        ManifestPriority::Critical,
        ManifestPriority::High,
    ] {
        service
            .create(
                CreateCargoManifest::new(
                    SpacecraftId::new(9),
                    CargoId::new(1),
                    StorageUnitId::new(5),
                    1,
                    UserId::new(2),
                )
                .with_priority(priority),
            )
            .await
            .unwrap();
    }

    let priorities: Vec<_> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.record.priority)
        .collect();
    assert_eq!(
        priorities,
        vec![
            ManifestPriority::Critical,
            ManifestPriority::High,
            ManifestPriority::Normal
        ]
    );
}
