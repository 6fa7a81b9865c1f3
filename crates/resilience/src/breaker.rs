//! Circuit breaker for a single dependency.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{BreakerConfig, SlidingWindowType};
use crate::error::ConfigError;
use crate::state::CircuitState;
use crate::window::{CallOutcome, SlidingWindow};

/// Admission ticket for one call.
///
/// Carries the breaker generation it was issued in, so that an outcome
/// arriving after a state change is not mistaken for a trial of the new
/// state.
#[derive(Debug)]
#[must_use = "a permit must be handed back through CircuitBreaker::record"]
pub struct Permit {
    generation: u64,
}

/// Read-only view of a breaker for operators and dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    /// Percent of failed calls in the window; None until enough calls are buffered.
    pub failure_rate: Option<f64>,
    pub buffered_calls: u32,
    pub failed_calls: u32,
    pub slow_calls: u32,
    pub failure_rate_threshold: f64,
    pub sliding_window_type: SlidingWindowType,
    pub sliding_window_size: u32,
    pub minimum_number_of_calls: u32,
    pub wait_duration_in_open_state_ms: u64,
    pub current_wait_duration_ms: u64,
    pub permitted_number_of_calls_in_half_open_state: u32,
    pub half_open_calls_admitted: u32,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    window: SlidingWindow,
    generation: u64,
    opened_at: Option<Instant>,
    current_wait: Duration,
    trials_admitted: u32,
    trials_completed: u32,
    trials_failed: u32,
}

/// Gate in front of one remote dependency.
///
/// All state sits behind one mutex that is never held across an await, so
/// [`permit`](Self::permit) never suspends. Holding the lock for the whole
/// check-and-update guarantees that the Open → HalfOpen transition happens
/// once and that half-open admission never exceeds the trial count.
///
/// State is process-local; a new breaker always starts Closed and empty.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker for the named dependency.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(name, config))
    }

    pub(crate) fn from_validated(name: impl Into<String>, config: BreakerConfig) -> Self {
        let inner = Inner {
            state: CircuitState::Closed,
            window: SlidingWindow::new(config.sliding_window_type, config.sliding_window_size),
            generation: 0,
            opened_at: None,
            current_wait: config.wait_duration_in_open_state,
            trials_admitted: 0,
            trials_completed: 0,
            trials_failed: 0,
        };
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(inner),
        }
    }

    /// Returns the dependency name this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Returns the current state.
    ///
    /// An Open breaker whose wait has elapsed still reports Open until the
    /// next permit request moves it to HalfOpen.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Reserves admission for one call and returns true if it was granted.
    ///
    /// This is not a read-only check: in HalfOpen a granted permit takes one
    /// trial slot, and the slot is only given back by the matching
    /// [`record_outcome`](Self::record_outcome). Use [`state`](Self::state)
    /// or [`snapshot`](Self::snapshot) to inspect the breaker without
    /// reserving.
    pub fn permit(&self) -> bool {
        self.try_acquire().is_some()
    }

    /// Asks for admission of one call.
    pub fn try_acquire(&self) -> Option<Permit> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => Some(Permit {
                generation: inner.generation,
            }),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(Duration::MAX);

                if elapsed >= inner.current_wait {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.trials_admitted = 1;
                    Some(Permit {
                        generation: inner.generation,
                    })
                } else {
                    self.reject(inner.current_wait.saturating_sub(elapsed));
                    None
                }
            }
            CircuitState::HalfOpen => {
                if inner.trials_admitted < self.config.permitted_number_of_calls_in_half_open_state
                {
                    inner.trials_admitted += 1;
                    Some(Permit {
                        generation: inner.generation,
                    })
                } else {
                    self.reject(Duration::ZERO);
                    None
                }
            }
        }
    }

    /// Records the outcome of a call admitted with `permit`.
    pub fn record(&self, permit: Permit, outcome: CallOutcome) {
        let mut inner = self.inner.lock();
        self.apply(&mut inner, permit.generation, outcome);
    }

    /// Records an outcome against the current state.
    pub fn record_outcome(&self, outcome: CallOutcome) {
        let mut inner = self.inner.lock();
        let generation = inner.generation;
        self.apply(&mut inner, generation, outcome);
    }

    /// Classifies a successful call by its duration.
    pub fn classify_success(&self, elapsed: Duration) -> CallOutcome {
        CallOutcome::success_after(elapsed, self.config.slow_call_duration_threshold)
    }

    /// Forces the breaker back to Closed with an empty window.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.close(&mut inner);
    }

    /// Returns a read-only view of the breaker.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let counts = inner.window.counts(now);

        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_rate: counts.failure_rate(self.config.minimum_number_of_calls),
            buffered_calls: counts.total,
            failed_calls: counts.failed,
            slow_calls: counts.slow,
            failure_rate_threshold: self.config.failure_rate_threshold,
            sliding_window_type: self.config.sliding_window_type,
            sliding_window_size: self.config.sliding_window_size,
            minimum_number_of_calls: self.config.minimum_number_of_calls,
            wait_duration_in_open_state_ms: duration_ms(self.config.wait_duration_in_open_state),
            current_wait_duration_ms: duration_ms(inner.current_wait),
            permitted_number_of_calls_in_half_open_state: self
                .config
                .permitted_number_of_calls_in_half_open_state,
            half_open_calls_admitted: inner.trials_admitted,
        }
    }

    fn apply(&self, inner: &mut Inner, generation: u64, outcome: CallOutcome) {
        let now = Instant::now();

        if generation != inner.generation {
            // Late outcome from a call admitted before the last transition.
            if inner.state == CircuitState::Closed {
                inner.window.record(now, outcome);
                self.evaluate_window(inner, now);
            } else {
                debug!(
                    dependency = %self.name,
                    outcome = outcome.as_str(),
                    state = %inner.state,
                    "discarding outcome from previous breaker state"
                );
            }
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.window.record(now, outcome);
                self.evaluate_window(inner, now);
            }
            CircuitState::Open => inner.window.record(now, outcome),
            CircuitState::HalfOpen => {
                inner.trials_completed += 1;
                if outcome.is_failure() {
                    inner.trials_failed += 1;
                }

                let trials = self.config.permitted_number_of_calls_in_half_open_state;
                if inner.trials_completed >= trials {
                    let rate =
                        f64::from(inner.trials_failed) * 100.0 / f64::from(inner.trials_completed);
                    if rate >= self.config.failure_rate_threshold {
                        let wait = self.config.next_wait(inner.current_wait);
                        warn!(
                            dependency = %self.name,
                            failure_rate = rate,
                            wait_ms = duration_ms(wait),
                            "trial calls failed, reopening circuit"
                        );
                        self.trip(inner, now, wait);
                    } else {
                        self.close(inner);
                    }
                }
            }
        }
    }

    fn evaluate_window(&self, inner: &mut Inner, now: Instant) {
        let counts = inner.window.counts(now);
        if let Some(rate) = counts.failure_rate(self.config.minimum_number_of_calls)
            && rate >= self.config.failure_rate_threshold
        {
            warn!(
                dependency = %self.name,
                failure_rate = rate,
                calls = counts.total,
                failed = counts.failed,
                "failure rate above threshold, opening circuit"
            );
            self.trip(inner, now, self.config.wait_duration_in_open_state);
        }
    }

    fn trip(&self, inner: &mut Inner, now: Instant, wait: Duration) {
        inner.opened_at = Some(now);
        inner.current_wait = wait;
        self.transition(inner, CircuitState::Open);
    }

    fn close(&self, inner: &mut Inner) {
        inner.window.clear();
        inner.opened_at = None;
        inner.current_wait = self.config.wait_duration_in_open_state;
        self.transition(inner, CircuitState::Closed);
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.trials_admitted = 0;
        inner.trials_completed = 0;
        inner.trials_failed = 0;

        if from != to {
            info!(dependency = %self.name, %from, %to, "circuit breaker state changed");
            metrics::counter!(
                "circuit_breaker_transitions_total",
                "dependency" => self.name.clone(),
                "to" => to.as_str()
            )
            .increment(1);
        }
    }

    fn reject(&self, remaining: Duration) {
        debug!(
            dependency = %self.name,
            remaining_ms = duration_ms(remaining),
            "circuit breaker rejected call"
        );
        metrics::counter!("circuit_breaker_rejections_total", "dependency" => self.name.clone())
            .increment(1);
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
