//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: upstream assumed down, calls are short-circuited
//! - Half-Open: a single trial call probes for recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure ratio >= threshold over the last `window_size` calls
//!                (evaluated once `minimum_calls` outcomes are buffered)
//! Open → Half-Open: first call after the cool-down elapses (becomes the trial)
//! Half-Open → Closed: trial succeeds (window reset)
//! Half-Open → Open: trial fails (cool-down restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per upstream, shared by every request
//! - State and window live behind a single mutex, held only while deciding or
//!   recording, never across the network call
//! - Each transition bumps a generation; outcomes admitted under an older
//!   generation are dropped, so concurrent callers cannot apply a transition twice
//! - Permits are RAII guards: a permit dropped without a report counts as a failure

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Result of a guarded call, as reported back to the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Point-in-time view of the breaker, for status endpoints and logs.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    /// Failure ratio over the buffered window (0.0 when empty).
    pub failure_rate: f64,
    pub buffered_calls: usize,
    pub failed_calls: usize,
    /// How many times the breaker has tripped open since startup.
    pub times_opened: u64,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { since: Instant },
    HalfOpen,
}

impl Phase {
    fn state(&self) -> CircuitState {
        match self {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen => CircuitState::HalfOpen,
        }
    }
}

/// Count-based sliding window of recent outcomes.
#[derive(Debug)]
struct Window {
    outcomes: VecDeque<Outcome>,
    failures: usize,
    capacity: usize,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            failures: 0,
            capacity,
        }
    }

    fn push(&mut self, outcome: Outcome) {
        if self.outcomes.len() == self.capacity {
            if let Some(Outcome::Failure) = self.outcomes.pop_front() {
                self.failures -= 1;
            }
        }
        if outcome == Outcome::Failure {
            self.failures += 1;
        }
        self.outcomes.push_back(outcome);
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }

    fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.failures as f64 / self.outcomes.len() as f64
        }
    }

    fn clear(&mut self) {
        self.outcomes.clear();
        self.failures = 0;
    }
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    generation: u64,
    window: Window,
    times_opened: u64,
}

/// Circuit breaker guarding a single upstream.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: BreakerConfig,
    cooldown: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a closed breaker. `name` labels logs and metrics.
    pub fn new(name: &'static str, config: BreakerConfig) -> Self {
        let window_size = config.window_size.max(1);
        metrics::record_breaker_state(name, CircuitState::Closed);
        Self {
            name,
            cooldown: config.open_cooldown(),
            config,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                generation: 0,
                window: Window::new(window_size),
                times_opened: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask permission to call the upstream.
    ///
    /// Returns `None` when the call must be short-circuited: the breaker is Open
    /// and still cooling down, or Half-Open with its trial already in flight.
    /// The first caller after the cool-down moves the breaker to Half-Open and
    /// receives the trial permit.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CallPermit> {
        let mut inner = self.lock();
        let phase = inner.phase;
        match phase {
            Phase::Closed => Some(self.permit(inner.generation)),
            Phase::Open { since } if since.elapsed() >= self.cooldown => {
                self.transition(&mut inner, Phase::HalfOpen);
                tracing::info!(breaker = self.name, "Cool-down elapsed, admitting trial call");
                Some(self.permit(inner.generation))
            }
            Phase::Open { .. } | Phase::HalfOpen => None,
        }
    }

    /// Current state without side effects.
    ///
    /// An Open breaker whose cool-down has elapsed still reports Open until the
    /// next call attempt moves it to Half-Open.
    pub fn state(&self) -> CircuitState {
        self.lock().phase.state()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.phase.state(),
            failure_rate: inner.window.failure_rate(),
            buffered_calls: inner.window.len(),
            failed_calls: inner.window.failures,
            times_opened: inner.times_opened,
        }
    }

    fn permit(self: &Arc<Self>, generation: u64) -> CallPermit {
        CallPermit {
            breaker: Arc::clone(self),
            generation,
            reported: false,
        }
    }

    fn record(&self, generation: u64, outcome: Outcome) {
        let mut inner = self.lock();
        if generation != inner.generation {
            tracing::debug!(
                breaker = self.name,
                ?outcome,
                "Ignoring outcome admitted before the last transition"
            );
            return;
        }

        let phase = inner.phase;
        match phase {
            Phase::Closed => {
                inner.window.push(outcome);
                let buffered = inner.window.len();
                let failure_rate = inner.window.failure_rate();
                if buffered >= self.config.minimum_calls
                    && failure_rate >= self.config.failure_rate_threshold
                {
                    tracing::warn!(
                        breaker = self.name,
                        failure_rate,
                        buffered,
                        threshold = self.config.failure_rate_threshold,
                        "Failure rate threshold reached, opening circuit"
                    );
                    self.transition(&mut inner, Phase::Open { since: Instant::now() });
                }
            }
            Phase::HalfOpen => match outcome {
                Outcome::Success => {
                    tracing::info!(breaker = self.name, "Trial call succeeded, closing circuit");
                    self.transition(&mut inner, Phase::Closed);
                }
                Outcome::Failure => {
                    tracing::warn!(breaker = self.name, "Trial call failed, reopening circuit");
                    self.transition(&mut inner, Phase::Open { since: Instant::now() });
                }
            },
            // Open never hands out permits for its own generation.
            Phase::Open { .. } => {}
        }
    }

    /// The only place the phase changes.
    fn transition(&self, inner: &mut Inner, to: Phase) {
        let from = inner.phase.state();
        inner.phase = to;
        inner.generation += 1;
        inner.window.clear();
        if let Phase::Open { .. } = to {
            inner.times_opened += 1;
        }
        metrics::record_breaker_transition(self.name, from, to.state());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves Inner consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Permission to make one upstream call.
///
/// Report the result with [`CallPermit::report`]. A permit dropped unreported
/// (e.g. the attempt panicked) is recorded as a failure so a Half-Open trial
/// can never be leaked.
#[derive(Debug)]
#[must_use = "an unreported permit counts as a failure"]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    reported: bool,
}

impl CallPermit {
    pub fn report(mut self, outcome: Outcome) {
        self.reported = true;
        self.breaker.record(self.generation, outcome);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.reported {
            self.breaker.record(self.generation, Outcome::Failure);
        }
    }
}
