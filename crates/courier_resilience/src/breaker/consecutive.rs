//! Consecutive-failure circuit breaker.

use super::{BreakerSettings, BreakerState, CircuitBreaker};
use async_trait::async_trait;
use courier_core::ApiResponse;
use courier_error::{BreakerOpenError, BreakerRejection, CourierResult};
use futures::future::BoxFuture;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failures: u32,
    opened_at: Option<Instant>,
    trials: u32,
    // Bumped on every state change so outcomes from an earlier state are dropped.
    generation: u64,
}

impl BreakerInner {
    fn transition(&mut self, name: &str, to: BreakerState) {
        debug!(breaker = name, from = %self.state, to = %to, "Breaker state change");
        self.state = to;
        self.generation = self.generation.wrapping_add(1);
        self.trials = 0;
        match to {
            BreakerState::Open => self.opened_at = Some(Instant::now()),
            BreakerState::Closed => {
                self.failures = 0;
                self.opened_at = None;
            }
            BreakerState::HalfOpen => {}
        }
    }
}

/// Opens after a run of consecutive transport failures.
///
/// - closed: every call runs; a success zeroes the failure run, and the
///   `consecutive_failures`-th failure in a row opens the breaker
/// - open: calls are rejected until `open_timeout` has elapsed
/// - half-open: up to `half_open_max_requests` trial calls run; one success
///   closes the breaker, one failure reopens it
///
/// Any response that reaches the client counts as a success, whatever its
/// status. Only transport errors count as failures.
#[derive(Debug)]
pub struct ConsecutiveFailureBreaker {
    settings: BreakerSettings,
    inner: Mutex<BreakerInner>,
}

impl ConsecutiveFailureBreaker {
    /// Create a closed breaker.
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            settings,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failures: 0,
                opened_at: None,
                trials: 0,
                generation: 0,
            }),
        }
    }

    /// Settings this breaker runs with.
    pub fn settings(&self) -> &BreakerSettings {
        &self.settings
    }

    /// Length of the current failure run.
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().failures
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn admit(&self) -> CourierResult<Ticket<'_>> {
        let mut inner = self.lock();
        if inner.state == BreakerState::Open
            && inner
                .opened_at
                .is_some_and(|at| at.elapsed() >= *self.settings.open_timeout())
        {
            inner.transition(self.settings.name(), BreakerState::HalfOpen);
        }

        match inner.state {
            BreakerState::Closed => Ok(Ticket {
                breaker: self,
                generation: inner.generation,
                trial: false,
            }),
            BreakerState::Open => {
                Err(BreakerOpenError::new(self.settings.name(), BreakerRejection::Open).into())
            }
            BreakerState::HalfOpen => {
                if inner.trials >= *self.settings.half_open_max_requests() {
                    return Err(BreakerOpenError::new(
                        self.settings.name(),
                        BreakerRejection::TooManyTrialRequests,
                    )
                    .into());
                }
                inner.trials += 1;
                Ok(Ticket {
                    breaker: self,
                    generation: inner.generation,
                    trial: true,
                })
            }
        }
    }

    fn record(&self, ticket: &Ticket<'_>, success: bool) {
        let mut inner = self.lock();
        if inner.generation != ticket.generation {
            return;
        }
        let name = self.settings.name();

        match (inner.state, success) {
            (BreakerState::Closed, true) => inner.failures = 0,
            (BreakerState::Closed, false) => {
                inner.failures += 1;
                if inner.failures >= *self.settings.consecutive_failures() {
                    warn!(
                        breaker = %name,
                        failures = inner.failures,
                        open_for = ?self.settings.open_timeout(),
                        "Circuit breaker tripped"
                    );
                    inner.transition(name, BreakerState::Open);
                }
            }
            (BreakerState::HalfOpen, true) => {
                info!(breaker = %name, "Circuit breaker closed after successful trial");
                inner.transition(name, BreakerState::Closed);
            }
            (BreakerState::HalfOpen, false) => {
                warn!(breaker = %name, "Trial call failed, circuit breaker reopened");
                inner.transition(name, BreakerState::Open);
            }
            (BreakerState::Open, _) => {}
        }
    }
}

/// Admission receipt for one call; frees its trial slot when dropped.
struct Ticket<'a> {
    breaker: &'a ConsecutiveFailureBreaker,
    generation: u64,
    trial: bool,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if !self.trial {
            return;
        }
        let mut inner = self.breaker.lock();
        if inner.generation == self.generation && inner.state == BreakerState::HalfOpen {
            inner.trials = inner.trials.saturating_sub(1);
        }
    }
}

#[async_trait]
impl CircuitBreaker for ConsecutiveFailureBreaker {
    fn name(&self) -> &str {
        self.settings.name()
    }

    fn state(&self) -> BreakerState {
        let inner = self.lock();
        match (inner.state, inner.opened_at) {
            (BreakerState::Open, Some(at)) if at.elapsed() >= *self.settings.open_timeout() => {
                BreakerState::HalfOpen
            }
            (state, _) => state,
        }
    }

    async fn execute(
        &self,
        call: BoxFuture<'static, CourierResult<ApiResponse>>,
    ) -> CourierResult<ApiResponse> {
        let ticket = self.admit()?;
        let outcome = call.await;
        self.record(&ticket, outcome.is_ok());
        outcome
    }
}
