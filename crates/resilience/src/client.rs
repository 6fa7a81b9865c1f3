//! Breaker-protected client for one remote dependency.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::EntityKind;
use tokio::time::Instant;
use tracing::{Instrument, debug, warn};

use crate::breaker::{CircuitBreaker, Permit};
use crate::error::{CallFailure, DependencyError, LookupError};
use crate::lookup::RemoteLookup;
use crate::registry::BreakerRegistry;
use crate::window::CallOutcome;

/// Default bound on a single remote call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Turns a call that produced no answer into the error handed to the caller.
///
/// Receives the dependency name and the reason the call failed.
pub type Fallback = Arc<dyn Fn(&str, &CallFailure) -> DependencyError + Send + Sync>;

/// The fallback every client starts with: report the dependency as unavailable.
pub fn unavailable_fallback() -> Fallback {
    Arc::new(|dependency, failure| DependencyError::Unavailable {
        dependency: dependency.to_string(),
        reason: failure.clone(),
    })
}

/// Confirms that a referenced entity exists in the service that owns it.
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// Name of the dependency answering the check.
    fn dependency(&self) -> &str;

    /// Kind of entity this check looks up.
    fn entity_kind(&self) -> EntityKind;

    /// Returns Ok if the entity exists, `NotFound` if the remote says it
    /// does not, and `Unavailable` if no answer could be obtained.
    async fn ensure_exists(&self, id: i64) -> Result<(), DependencyError>;
}

/// Wraps a [`RemoteLookup`] with a circuit breaker, a timeout and a fallback.
///
/// Every call asks the breaker first; a refused call returns through the
/// fallback without touching the lookup. An admitted call runs on its own
/// task so that its outcome is recorded even if the caller stops waiting.
/// Calls are never retried.
///
/// | lookup result                  | recorded         | returned       |
/// |--------------------------------|------------------|----------------|
/// | found / `true`                 | success or slow  | value          |
/// | absent / `false`               | success or slow  | `NotFound`     |
/// | any `LookupError`              | failure          | fallback       |
/// | timeout                        | failure          | fallback       |
/// | refused by breaker             | nothing          | fallback       |
pub struct ResilientClient<L: RemoteLookup> {
    dependency: String,
    entity: EntityKind,
    lookup: Arc<L>,
    breaker: Arc<CircuitBreaker>,
    timeout: Duration,
    fallback: Fallback,
}

impl<L: RemoteLookup> std::fmt::Debug for ResilientClient<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("dependency", &self.dependency)
            .field("entity", &self.entity)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<L: RemoteLookup> ResilientClient<L> {
    /// Creates a client for `dependency` using the registry's breaker of the same name.
    pub fn new(
        dependency: impl Into<String>,
        entity: EntityKind,
        lookup: L,
        registry: &BreakerRegistry,
    ) -> Self {
        let dependency = dependency.into();
        let breaker = registry.breaker(&dependency);
        Self {
            dependency,
            entity,
            lookup: Arc::new(lookup),
            breaker,
            timeout: DEFAULT_CALL_TIMEOUT,
            fallback: unavailable_fallback(),
        }
    }

    /// Sets the bound on each remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the fallback.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&str, &CallFailure) -> DependencyError + Send + Sync + 'static,
    {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.entity
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Asks whether the entity with `id` exists.
    #[tracing::instrument(skip(self), fields(dependency = %self.dependency))]
    pub async fn exists(&self, id: i64) -> Result<bool, DependencyError> {
        self.call(move |lookup| async move { lookup.exists(id).await })
            .await
    }

    /// Fetches the entity with `id`; absence is `NotFound`.
    #[tracing::instrument(skip(self), fields(dependency = %self.dependency))]
    pub async fn get_by_id(&self, id: i64) -> Result<L::Entity, DependencyError> {
        self.call(move |lookup| async move { lookup.get_by_id(id).await })
            .await?
            .ok_or(DependencyError::NotFound {
                entity: self.entity,
                id,
            })
    }

    async fn call<T, F, Fut>(&self, op: F) -> Result<T, DependencyError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<L>) -> Fut,
        Fut: Future<Output = Result<T, LookupError>> + Send + 'static,
    {
        let Some(permit) = self.breaker.try_acquire() else {
            debug!("call refused by circuit breaker");
            self.count_call("rejected");
            return Err(self.fall_back(CallFailure::Rejected));
        };

        let mut guard = OutcomeGuard {
            breaker: Arc::clone(&self.breaker),
            permit: Some(permit),
        };
        let dependency = self.dependency.clone();
        let timeout = self.timeout;
        let remote = op(Arc::clone(&self.lookup));

        let task = tokio::spawn(
            async move {
                let started = Instant::now();
                let result = tokio::time::timeout(timeout, remote).await;
                let elapsed = started.elapsed();

                let (outcome, result) = match result {
                    Ok(Ok(value)) => (guard.breaker.classify_success(elapsed), Ok(value)),
                    Ok(Err(err)) => (CallOutcome::Failure, Err(CallFailure::Lookup(err))),
                    Err(_) => (CallOutcome::Failure, Err(CallFailure::Timeout(timeout))),
                };
                guard.finish(outcome);

                let label = match &result {
                    Err(CallFailure::Timeout(_)) => "timeout",
                    _ => outcome.as_str(),
                };
                metrics::counter!(
                    "dependency_calls_total",
                    "dependency" => dependency.clone(),
                    "outcome" => label
                )
                .increment(1);
                metrics::histogram!("dependency_call_duration_seconds", "dependency" => dependency)
                    .record(elapsed.as_secs_f64());

                result
            }
            .in_current_span(),
        );

        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => {
                warn!(error = %failure, "dependency call failed");
                Err(self.fall_back(failure))
            }
            Err(err) => {
                warn!(error = %err, "dependency call aborted");
                self.count_call("aborted");
                Err(self.fall_back(CallFailure::Aborted))
            }
        }
    }

    fn fall_back(&self, failure: CallFailure) -> DependencyError {
        (self.fallback)(&self.dependency, &failure)
    }

    fn count_call(&self, outcome: &'static str) {
        metrics::counter!(
            "dependency_calls_total",
            "dependency" => self.dependency.clone(),
            "outcome" => outcome
        )
        .increment(1);
    }
}

#[async_trait]
impl<L: RemoteLookup> ExistenceCheck for ResilientClient<L> {
    fn dependency(&self) -> &str {
        &self.dependency
    }

    fn entity_kind(&self) -> EntityKind {
        self.entity
    }

    async fn ensure_exists(&self, id: i64) -> Result<(), DependencyError> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(DependencyError::NotFound {
                entity: self.entity,
                id,
            })
        }
    }
}

/// Hands an admitted call's outcome back to the breaker exactly once.
///
/// If the call task unwinds before an outcome is known, the call is recorded
/// as a failure so a half-open trial slot is never leaked.
struct OutcomeGuard {
    breaker: Arc<CircuitBreaker>,
    permit: Option<Permit>,
}

impl OutcomeGuard {
    fn finish(&mut self, outcome: CallOutcome) {
        if let Some(permit) = self.permit.take() {
            self.breaker.record(permit, outcome);
        }
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        self.finish(CallOutcome::Failure);
    }
}
