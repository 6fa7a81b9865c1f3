//! Circuit breaker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the sliding window bounds the outcomes it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlidingWindowType {
    /// Keep the last `sliding_window_size` outcomes.
    #[default]
    CountBased,

    /// Keep outcomes from the last `sliding_window_size` seconds.
    TimeBased,
}

impl SlidingWindowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlidingWindowType::CountBased => "COUNT_BASED",
            SlidingWindowType::TimeBased => "TIME_BASED",
        }
    }
}

impl std::str::FromStr for SlidingWindowType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COUNT_BASED" => Ok(SlidingWindowType::CountBased),
            "TIME_BASED" => Ok(SlidingWindowType::TimeBased),
            other => Err(ConfigError::Invalid {
                field: "sliding_window_type",
                reason: format!("unknown window type '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for SlidingWindowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for one circuit breaker.
///
/// Defaults:
/// - `failure_rate_threshold`: 50 (percent)
/// - `sliding_window_size`: 10 calls
/// - `minimum_number_of_calls`: 5
/// - `wait_duration_in_open_state`: 10s
/// - `permitted_number_of_calls_in_half_open_state`: 3
/// - `slow_call_duration_threshold`: none (slow successes count as successes)
/// - `backoff_multiplier`: 1.0 (no backoff), capped by `max_wait_duration_in_open_state`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    pub failure_rate_threshold: f64,
    pub sliding_window_type: SlidingWindowType,
    pub sliding_window_size: u32,
    pub minimum_number_of_calls: u32,
    pub wait_duration_in_open_state: Duration,
    pub permitted_number_of_calls_in_half_open_state: u32,
    pub slow_call_duration_threshold: Option<Duration>,
    pub backoff_multiplier: f64,
    pub max_wait_duration_in_open_state: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_type: SlidingWindowType::CountBased,
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            wait_duration_in_open_state: Duration::from_secs(10),
            permitted_number_of_calls_in_half_open_state: 3,
            slow_call_duration_threshold: None,
            backoff_multiplier: 1.0,
            max_wait_duration_in_open_state: Duration::from_secs(300),
        }
    }
}

impl BreakerConfig {
    /// Checks that the settings describe a breaker that can ever close.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.failure_rate_threshold.is_finite()
            || !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 100.0)
        {
            return Err(ConfigError::Invalid {
                field: "failure_rate_threshold",
                reason: format!("{} is outside (0, 100]", self.failure_rate_threshold),
            });
        }
        if self.sliding_window_size == 0 {
            return Err(ConfigError::Invalid {
                field: "sliding_window_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.minimum_number_of_calls == 0 {
            return Err(ConfigError::Invalid {
                field: "minimum_number_of_calls",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.sliding_window_type == SlidingWindowType::CountBased
            && self.minimum_number_of_calls > self.sliding_window_size
        {
            return Err(ConfigError::Invalid {
                field: "minimum_number_of_calls",
                reason: format!(
                    "{} exceeds the count-based window size {}",
                    self.minimum_number_of_calls, self.sliding_window_size
                ),
            });
        }
        if self.permitted_number_of_calls_in_half_open_state == 0 {
            return Err(ConfigError::Invalid {
                field: "permitted_number_of_calls_in_half_open_state",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                field: "backoff_multiplier",
                reason: format!(
                    "{} is not a finite value of at least 1.0",
                    self.backoff_multiplier
                ),
            });
        }
        if self.max_wait_duration_in_open_state < self.wait_duration_in_open_state {
            return Err(ConfigError::Invalid {
                field: "max_wait_duration_in_open_state",
                reason: "must not be shorter than wait_duration_in_open_state".to_string(),
            });
        }
        Ok(())
    }

    /// The wait that follows `current` after a failed half-open trial cycle.
    ///
    /// Never exceeds `max_wait_duration_in_open_state`, including when the
    /// product overflows a `Duration`.
    pub fn next_wait(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_multiplier)
            .map_or(self.max_wait_duration_in_open_state, |wait| {
                wait.min(self.max_wait_duration_in_open_state)
            })
    }
}
