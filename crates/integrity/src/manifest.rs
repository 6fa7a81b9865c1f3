//! Cargo manifest service.

use common::RecordId;
use domain::{CargoManifest, CreateCargoManifest, DomainError, UpdateCargoManifest};
use record_store::{Record, RecordStore, Stored, Version};

use crate::error::{Result, ServiceError};
use crate::validator::ExistenceValidator;

/// Creates and updates cargo manifests after checking what they point at.
pub struct CargoManifestService<S: RecordStore<CargoManifest>> {
    store: S,
    validator: ExistenceValidator,
}

impl<S: RecordStore<CargoManifest>> CargoManifestService<S> {
    pub fn new(store: S, validator: ExistenceValidator) -> Self {
        Self { store, validator }
    }

    /// Declares a new manifest.
    #[tracing::instrument(skip(self, cmd), fields(status = ?cmd.status))]
    pub async fn create(&self, cmd: CreateCargoManifest) -> Result<Stored<CargoManifest>> {
        self.validator.validate(&cmd).await?;

        let manifest = CargoManifest::create(&cmd).map_err(DomainError::from)?;
        let stored = self.store.insert(manifest).await?;

        metrics::counter!("cargo_manifests_written_total", "op" => "create").increment(1);
        tracing::info!(manifest_id = %stored.record.id, status = %stored.record.status, "cargo manifest created");

        Ok(stored)
    }

    /// Applies `cmd` to the manifest `id`.
    ///
    /// Only references present on the update are checked. With
    /// `expected_version` set, the update fails if the manifest changed since
    /// the caller read it; without it, the update applies to whatever version
    /// is current when it is read here.
    #[tracing::instrument(skip(self, cmd), fields(status = ?cmd.status))]
    pub async fn update(
        &self,
        id: RecordId,
        cmd: UpdateCargoManifest,
        expected_version: Option<Version>,
    ) -> Result<Stored<CargoManifest>> {
        let current = self.get(id).await?;

        self.validator.validate(&cmd).await?;

        let manifest = current.record.updated(&cmd).map_err(DomainError::from)?;
        let expected = expected_version.unwrap_or(current.version);
        let stored = self.store.update(manifest, expected).await?;

        metrics::counter!("cargo_manifests_written_total", "op" => "update").increment(1);
        tracing::info!(
            manifest_id = %id,
            version = %stored.version,
            status = %stored.record.status,
            "cargo manifest updated"
        );

        Ok(stored)
    }

    /// Loads a manifest by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: RecordId) -> Result<Stored<CargoManifest>> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::RecordNotFound {
                record_type: CargoManifest::record_type(),
                id,
            })
    }

    /// Lists every manifest, highest priority first, then oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Stored<CargoManifest>>> {
        let mut manifests = self.store.find_all().await?;
        manifests.sort_by(|a, b| {
            b.record
                .priority
                .cmp(&a.record.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(manifests)
    }
}
