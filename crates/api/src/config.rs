//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use common::EntityKind;
use resilience::{BreakerConfig, DEFAULT_CALL_TIMEOUT};

/// One remote service this process checks references against.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyConfig {
    /// Breaker and metrics name, e.g. `"cargo-service"`.
    pub name: String,
    pub kind: EntityKind,
    /// Base URL of the entity collection; None leaves the dependency unwired.
    pub url: Option<String>,
    pub timeout: Duration,
    pub breaker: BreakerConfig,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `BREAKER_*`: default circuit breaker settings
/// - `<PREFIX>_URL`, `<PREFIX>_TIMEOUT_MS`: per dependency, where the prefix
///   is `CARGO_SERVICE`, `STORAGE_UNIT_SERVICE`, `SPACECRAFT_SERVICE` or
///   `USER_SERVICE`
/// - `<PREFIX>_BREAKER_*`: per dependency breaker overrides
///
/// Unparseable values fall back to the default. A breaker configuration that
/// parses but does not validate is replaced by the defaults as a whole.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub breaker: BreakerConfig,
    pub dependencies: Vec<DependencyConfig>,
}

const DEPENDENCIES: [(&str, &str, EntityKind); 4] = [
    ("CARGO_SERVICE", "cargo-service", EntityKind::Cargo),
    (
        "STORAGE_UNIT_SERVICE",
        "storage-unit-service",
        EntityKind::StorageUnit,
    ),
    (
        "SPACECRAFT_SERVICE",
        "spacecraft-service",
        EntityKind::Spacecraft,
    ),
    ("USER_SERVICE", "user-service", EntityKind::User),
];

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let breaker = checked(breaker_config(&lookup, "", &BreakerConfig::default()), "default")
            .unwrap_or_default();

        let dependencies = DEPENDENCIES
            .iter()
            .map(|(prefix, name, kind)| {
                let own = breaker_config(&lookup, &format!("{prefix}_"), &breaker);
                DependencyConfig {
                    name: name.to_string(),
                    kind: *kind,
                    url: lookup(&format!("{prefix}_URL")).filter(|url| !url.is_empty()),
                    timeout: parse(&lookup, &format!("{prefix}_TIMEOUT_MS"))
                        .map(Duration::from_millis)
                        .unwrap_or(DEFAULT_CALL_TIMEOUT),
                    breaker: checked(own, name).unwrap_or_else(|| breaker.clone()),
                }
            })
            .collect();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT").unwrap_or(3000),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            breaker,
            dependencies,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the settings for the dependency named `name`.
    pub fn dependency(&self, name: &str) -> Option<&DependencyConfig> {
        self.dependencies.iter().find(|d| d.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

fn breaker_config(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    base: &BreakerConfig,
) -> BreakerConfig {
    let key = |name: &str| format!("{prefix}BREAKER_{name}");
    let millis = |name: &str| parse::<u64>(lookup, &key(name)).map(Duration::from_millis);

    BreakerConfig {
        failure_rate_threshold: parse(lookup, &key("FAILURE_RATE_THRESHOLD"))
            .unwrap_or(base.failure_rate_threshold),
        sliding_window_type: parse(lookup, &key("SLIDING_WINDOW_TYPE"))
            .unwrap_or(base.sliding_window_type),
        sliding_window_size: parse(lookup, &key("SLIDING_WINDOW_SIZE"))
            .unwrap_or(base.sliding_window_size),
        minimum_number_of_calls: parse(lookup, &key("MINIMUM_NUMBER_OF_CALLS"))
            .unwrap_or(base.minimum_number_of_calls),
        wait_duration_in_open_state: millis("WAIT_DURATION_MS")
            .unwrap_or(base.wait_duration_in_open_state),
        permitted_number_of_calls_in_half_open_state: parse(lookup, &key("HALF_OPEN_CALLS"))
            .unwrap_or(base.permitted_number_of_calls_in_half_open_state),
        slow_call_duration_threshold: millis("SLOW_CALL_THRESHOLD_MS")
            .or(base.slow_call_duration_threshold),
        backoff_multiplier: parse(lookup, &key("BACKOFF_MULTIPLIER"))
            .unwrap_or(base.backoff_multiplier),
        max_wait_duration_in_open_state: millis("MAX_WAIT_DURATION_MS")
            .unwrap_or(base.max_wait_duration_in_open_state),
    }
}

fn checked(config: BreakerConfig, scope: &str) -> Option<BreakerConfig> {
    match config.validate() {
        Ok(()) => Some(config),
        Err(err) => {
            tracing::warn!(scope, error = %err, "ignoring invalid breaker settings");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use resilience::SlidingWindowType;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.breaker, BreakerConfig::default());
        assert_eq!(config.dependencies.len(), 4);

        let cargo = config.dependency("cargo-service").unwrap();
        assert_eq!(cargo.kind, EntityKind::Cargo);
        assert_eq!(cargo.url, None);
        assert_eq!(cargo.timeout, DEFAULT_CALL_TIMEOUT);
    }

    #[test]
    fn test_addr_formatting() {
        let config = config(&[("HOST", "127.0.0.1"), ("PORT", "8080")]);
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_unparseable_port_uses_default() {
        let config = config(&[("PORT", "eighty")]);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_breaker_defaults_apply_to_every_dependency() {
        let config = config(&[
            ("BREAKER_FAILURE_RATE_THRESHOLD", "75"),
            ("BREAKER_WAIT_DURATION_MS", "2500"),
            ("BREAKER_SLIDING_WINDOW_TYPE", "time_based"),
        ]);

        assert_eq!(config.breaker.failure_rate_threshold, 75.0);
        for dependency in &config.dependencies {
            assert_eq!(dependency.breaker.failure_rate_threshold, 75.0);
            assert_eq!(
                dependency.breaker.wait_duration_in_open_state,
                Duration::from_millis(2500)
            );
            assert_eq!(
                dependency.breaker.sliding_window_type,
                SlidingWindowType::TimeBased
            );
        }
    }

    #[test]
    fn test_per_dependency_overrides() {
        let config = config(&[
            ("USER_SERVICE_URL", "http://users:8080/api/users"),
            ("USER_SERVICE_TIMEOUT_MS", "750"),
            ("USER_SERVICE_BREAKER_HALF_OPEN_CALLS", "1"),
            ("USER_SERVICE_BREAKER_SLOW_CALL_THRESHOLD_MS", "300"),
        ]);

        let users = config.dependency("user-service").unwrap();
        assert_eq!(users.url.as_deref(), Some("http://users:8080/api/users"));
        assert_eq!(users.timeout, Duration::from_millis(750));
        assert_eq!(users.breaker.permitted_number_of_calls_in_half_open_state, 1);
        assert_eq!(
            users.breaker.slow_call_duration_threshold,
            Some(Duration::from_millis(300))
        );

        let cargo = config.dependency("cargo-service").unwrap();
        assert_eq!(cargo.breaker, BreakerConfig::default());
    }

    #[test]
    fn test_non_finite_backoff_falls_back() {
        let config = config(&[
            ("BREAKER_BACKOFF_MULTIPLIER", "NaN"),
            ("USER_SERVICE_BREAKER_BACKOFF_MULTIPLIER", "inf"),
        ]);

        assert_eq!(config.breaker, BreakerConfig::default());
        let users = config.dependency("user-service").unwrap();
        assert_eq!(users.breaker.backoff_multiplier, 1.0);
        assert!(users.breaker.validate().is_ok());
    }

    #[test]
    fn test_invalid_breaker_settings_fall_back() {
        let config = config(&[
            ("BREAKER_FAILURE_RATE_THRESHOLD", "250"),
            ("CARGO_SERVICE_BREAKER_HALF_OPEN_CALLS", "0"),
        ]);

        assert_eq!(config.breaker, BreakerConfig::default());
        assert_eq!(
            config.dependency("cargo-service").unwrap().breaker,
            BreakerConfig::default()
        );
    }
}
