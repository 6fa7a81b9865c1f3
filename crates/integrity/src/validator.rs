//! Existence checks for the foreign references a command carries.

use std::sync::Arc;

use common::EntityKind;
use domain::{HasReferences, Reference};
use futures_util::future::join_all;
use resilience::{DependencyError, ExistenceCheck};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// A referenced entity that does not exist, tied to the field that named it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: &'static str,
    pub entity: EntityKind,
    pub id: i64,
    pub message: String,
}

impl FieldError {
    fn not_found(reference: &Reference) -> Self {
        let entity = reference.target.kind();
        let id = reference.target.raw_id();
        Self {
            field: reference.field,
            entity,
            id,
            message: format!("{entity} not found with id: {id}"),
        }
    }
}

/// Why a command's references were not accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    /// Every listed reference points at a missing entity.
    #[error("{} referenced entities not found", .0.len())]
    NotFound(Vec<FieldError>),

    /// The service owning `field`'s entity could not be asked.
    #[error("cannot verify {field}: {error}")]
    Unavailable {
        field: &'static str,
        error: DependencyError,
    },
}

/// What to do when a referenced entity is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// Check every reference concurrently and report all missing ones.
    #[default]
    Aggregate,

    /// Check references one at a time in field order and stop at the first problem.
    FailFirst,
}

/// Confirms every foreign reference on a command before it may change local state.
///
/// One [`ExistenceCheck`] per entity kind answers the questions. An
/// unreachable dependency always wins over missing entities: when the
/// validator cannot tell whether a reference is valid it does not claim the
/// request is wrong. Problems are reported in the command's field order.
#[derive(Clone)]
pub struct ExistenceValidator {
    cargo: Arc<dyn ExistenceCheck>,
    storage_units: Arc<dyn ExistenceCheck>,
    spacecraft: Arc<dyn ExistenceCheck>,
    users: Arc<dyn ExistenceCheck>,
    policy: NotFoundPolicy,
}

impl std::fmt::Debug for ExistenceValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistenceValidator")
            .field("cargo", &self.cargo.dependency())
            .field("storage_units", &self.storage_units.dependency())
            .field("spacecraft", &self.spacecraft.dependency())
            .field("users", &self.users.dependency())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ExistenceValidator {
    pub fn new(
        cargo: Arc<dyn ExistenceCheck>,
        storage_units: Arc<dyn ExistenceCheck>,
        spacecraft: Arc<dyn ExistenceCheck>,
        users: Arc<dyn ExistenceCheck>,
    ) -> Self {
        Self {
            cargo,
            storage_units,
            spacecraft,
            users,
            policy: NotFoundPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NotFoundPolicy {
        self.policy
    }

    /// Checks every present reference on `command`.
    pub async fn validate<C>(&self, command: &C) -> Result<(), ReferenceError>
    where
        C: HasReferences + ?Sized,
    {
        self.validate_references(&command.references()).await
    }

    /// Checks `references`, reporting problems in slice order.
    #[tracing::instrument(skip_all, fields(references = references.len(), policy = ?self.policy))]
    pub async fn validate_references(&self, references: &[Reference]) -> Result<(), ReferenceError> {
        match self.policy {
            NotFoundPolicy::Aggregate => self.check_all(references).await,
            NotFoundPolicy::FailFirst => self.check_in_order(references).await,
        }
    }

    async fn check_all(&self, references: &[Reference]) -> Result<(), ReferenceError> {
        let results = join_all(references.iter().map(|r| self.check(r))).await;

        let mut missing = Vec::new();
        for (reference, result) in references.iter().zip(results) {
            match result {
                Ok(()) => {}
                Err(error @ DependencyError::Unavailable { .. }) => {
                    return Err(self.unavailable(reference, error));
                }
                Err(DependencyError::NotFound { .. }) => {
                    missing.push(FieldError::not_found(reference));
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            debug!(missing = missing.len(), "referenced entities not found");
            Err(ReferenceError::NotFound(missing))
        }
    }

    async fn check_in_order(&self, references: &[Reference]) -> Result<(), ReferenceError> {
        for reference in references {
            match self.check(reference).await {
                Ok(()) => {}
                Err(error @ DependencyError::Unavailable { .. }) => {
                    return Err(self.unavailable(reference, error));
                }
                Err(DependencyError::NotFound { .. }) => {
                    debug!(field = reference.field, "referenced entity not found");
                    return Err(ReferenceError::NotFound(vec![FieldError::not_found(
                        reference,
                    )]));
                }
            }
        }
        Ok(())
    }

    async fn check(&self, reference: &Reference) -> Result<(), DependencyError> {
        let result = self
            .check_for(reference.target.kind())
            .ensure_exists(reference.target.raw_id())
            .await;

        let outcome = match &result {
            Ok(()) => "found",
            Err(DependencyError::NotFound { .. }) => "not_found",
            Err(DependencyError::Unavailable { .. }) => "unavailable",
        };
        metrics::counter!("reference_checks_total", "outcome" => outcome).increment(1);
        result
    }

    fn check_for(&self, kind: EntityKind) -> &Arc<dyn ExistenceCheck> {
        match kind {
            EntityKind::Cargo => &self.cargo,
            EntityKind::StorageUnit => &self.storage_units,
            EntityKind::Spacecraft => &self.spacecraft,
            EntityKind::User => &self.users,
        }
    }

    fn unavailable(&self, reference: &Reference, error: DependencyError) -> ReferenceError {
        warn!(field = reference.field, %error, "reference check failed");
        ReferenceError::Unavailable {
            field: reference.field,
            error,
        }
    }
}
