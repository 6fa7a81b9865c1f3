//! Sliding window of call outcomes.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::SlidingWindowType;

/// The result of one remote call attempt, as the breaker sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOutcome {
    /// The call completed within the slow-call threshold.
    Success,

    /// The call failed or timed out.
    Failure,

    /// The call succeeded but took longer than the slow-call threshold.
    SlowSuccess,
}

impl CallOutcome {
    /// Returns true if the outcome counts toward the failure rate.
    pub fn is_failure(&self) -> bool {
        matches!(self, CallOutcome::Failure | CallOutcome::SlowSuccess)
    }

    /// Classifies a successful call by how long it took.
    pub fn success_after(elapsed: Duration, slow_threshold: Option<Duration>) -> Self {
        match slow_threshold {
            Some(threshold) if elapsed > threshold => CallOutcome::SlowSuccess,
            _ => CallOutcome::Success,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::SlowSuccess => "slow_success",
        }
    }
}

/// Aggregate counts over the outcomes currently in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowCounts {
    pub total: u32,
    pub failed: u32,
    pub slow: u32,
}

impl WindowCounts {
    /// Failure rate in percent, or None until `minimum_calls` are buffered.
    pub fn failure_rate(&self, minimum_calls: u32) -> Option<f64> {
        if self.total == 0 || self.total < minimum_calls {
            return None;
        }
        Some(f64::from(self.failed) * 100.0 / f64::from(self.total))
    }
}

/// Bounded record of recent outcomes for one dependency.
///
/// Count-based windows keep the last `size` outcomes. Time-based windows keep
/// outcomes recorded within the last `size` seconds; eviction happens
/// whenever the window is read or written.
#[derive(Debug)]
pub struct SlidingWindow {
    kind: SlidingWindowType,
    size: u32,
    entries: VecDeque<(Instant, CallOutcome)>,
}

impl SlidingWindow {
    pub fn new(kind: SlidingWindowType, size: u32) -> Self {
        let capacity = match kind {
            SlidingWindowType::CountBased => size as usize,
            SlidingWindowType::TimeBased => 0,
        };
        Self {
            kind,
            size,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Records an outcome observed at `now`.
    pub fn record(&mut self, now: Instant, outcome: CallOutcome) {
        self.entries.push_back((now, outcome));
        self.evict(now);
    }

    /// Returns counts over the outcomes still in the window at `now`.
    pub fn counts(&mut self, now: Instant) -> WindowCounts {
        self.evict(now);
        let mut counts = WindowCounts::default();
        for (_, outcome) in &self.entries {
            counts.total += 1;
            if outcome.is_failure() {
                counts.failed += 1;
            }
            if *outcome == CallOutcome::SlowSuccess {
                counts.slow += 1;
            }
        }
        counts
    }

    /// Drops every recorded outcome.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict(&mut self, now: Instant) {
        match self.kind {
            SlidingWindowType::CountBased => {
                while self.entries.len() > self.size as usize {
                    self.entries.pop_front();
                }
            }
            SlidingWindowType::TimeBased => {
                let span = Duration::from_secs(u64::from(self.size));
                while let Some((at, _)) = self.entries.front() {
                    if now.saturating_duration_since(*at) >= span {
                        self.entries.pop_front();
                    } else {
                        break;
                    }
                }
            }
        }
    }
}
