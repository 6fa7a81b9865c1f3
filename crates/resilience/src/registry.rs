//! Registry of circuit breakers keyed by dependency name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::config::BreakerConfig;
use crate::error::ConfigError;
use crate::window::CallOutcome;

/// Owns one breaker per dependency and hands out shared references to it.
///
/// Breakers are created lazily on first use, from a per-name configuration
/// if one was registered and from the default otherwise. Clients receive the
/// registry explicitly; there is no process-global instance.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    default_config: BreakerConfig,
    configs: HashMap<String, BreakerConfig>,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    /// Creates a registry whose breakers use `default_config`.
    pub fn new(default_config: BreakerConfig) -> Result<Self, ConfigError> {
        default_config.validate()?;
        Ok(Self {
            default_config,
            configs: HashMap::new(),
            breakers: RwLock::new(HashMap::new()),
        })
    }

    /// Registers a configuration for one dependency.
    pub fn with_config(
        mut self,
        name: impl Into<String>,
        config: BreakerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        self.configs.insert(name.into(), config);
        Ok(self)
    }

    pub fn default_config(&self) -> &BreakerConfig {
        &self.default_config
    }

    /// Returns the configuration a breaker named `name` is (or will be) built with.
    pub fn config_for(&self, name: &str) -> &BreakerConfig {
        self.configs.get(name).unwrap_or(&self.default_config)
    }

    /// Returns the breaker for `name`, creating it if needed.
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.read().get(name) {
            return Arc::clone(breaker);
        }

        let mut breakers = self.breakers.write();
        let breaker = breakers.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(dependency = name, "creating circuit breaker");
            Arc::new(self.build(name))
        });
        Arc::clone(breaker)
    }

    /// Reserves admission for one call to `name`; see [`CircuitBreaker::permit`].
    ///
    /// A granted permit must be followed by one [`record_outcome`](Self::record_outcome).
    pub fn permit(&self, name: &str) -> bool {
        self.breaker(name).permit()
    }

    /// Records an outcome for `name`.
    pub fn record_outcome(&self, name: &str, outcome: CallOutcome) {
        self.breaker(name).record_outcome(outcome);
    }

    /// Returns a snapshot of `name`, or None if no breaker exists for it yet.
    pub fn state(&self, name: &str) -> Option<BreakerSnapshot> {
        self.breakers.read().get(name).map(|b| b.snapshot())
    }

    /// Returns snapshots of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.read().values().cloned().collect();
        let mut snapshots: Vec<_> = breakers.iter().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Resets `name` to Closed. Returns false if no such breaker exists.
    pub fn reset(&self, name: &str) -> bool {
        match self.breakers.read().get(name) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    fn build(&self, name: &str) -> CircuitBreaker {
        // Both the default and the per-name configs are validated on entry.
        CircuitBreaker::from_validated(name, self.config_for(name).clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::CircuitState;

    #[test]
    fn test_same_name_same_breaker() {
        let registry = BreakerRegistry::default();
        let a = registry.breaker("cargo-service");
        let b = registry.breaker("cargo-service");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_breakers_are_independent() {
        let registry = BreakerRegistry::default();
        for _ in 0..5 {
            assert!(registry.permit("cargo-service"));
            registry.record_outcome("cargo-service", CallOutcome::Failure);
        }

        assert!(!registry.permit("cargo-service"));
        assert!(registry.permit("user-service"));
    }

    #[test]
    fn test_per_name_config() {
        let registry = BreakerRegistry::new(BreakerConfig::default())
            .unwrap()
            .with_config(
                "user-service",
                BreakerConfig {
                    wait_duration_in_open_state: Duration::from_secs(30),
                    ..Default::default()
                },
            )
            .unwrap();

        registry.breaker("user-service");
        registry.breaker("cargo-service");

        let user = registry.state("user-service").unwrap();
        assert_eq!(user.wait_duration_in_open_state_ms, 30_000);
        let cargo = registry.state("cargo-service").unwrap();
        assert_eq!(cargo.wait_duration_in_open_state_ms, 10_000);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = BreakerRegistry::default().with_config(
            "cargo-service",
            BreakerConfig {
                failure_rate_threshold: 150.0,
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshots_sorted() {
        let registry = BreakerRegistry::default();
        registry.breaker("user-service");
        registry.breaker("cargo-service");
        registry.breaker("spacecraft-service");

        let names: Vec<_> = registry.snapshots().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["cargo-service", "spacecraft-service", "user-service"]
        );
    }

    #[test]
    fn test_state_of_unknown_dependency() {
        let registry = BreakerRegistry::default();
        assert!(registry.state("nothing").is_none());
        assert!(!registry.reset("nothing"));
    }

    #[test]
    fn test_reset() {
        let registry = BreakerRegistry::default();
        for _ in 0..5 {
            registry.record_outcome("cargo-service", CallOutcome::Failure);
        }
        assert_eq!(
            registry.state("cargo-service").unwrap().state,
            CircuitState::Open
        );

        assert!(registry.reset("cargo-service"));
        assert_eq!(
            registry.state("cargo-service").unwrap().state,
            CircuitState::Closed
        );
    }
}
