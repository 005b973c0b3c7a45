//! Adaptive token-bucket limiter built on governor.
//!
//! The bucket itself is a governor GCRA limiter, which is safe for concurrent
//! callers without extra locking. Changing its rate or burst means replacing
//! it, so the limiter keeps the active bucket together with its schedule in
//! one mutex-guarded [`AdmissionState`] and awaits the bucket outside the
//! lock.
//!
//! A bucket rebuilt by an adjustment starts drained, so the new rate applies
//! from the moment it fires. Each rebuild bumps a generation; a waiter whose
//! bucket was replaced while it was parked queues again on the current one.

use crate::{Rate, RateLimitSnapshot};
use courier_error::{CancelledError, CourierResult, SuspendPoint};
use governor::DefaultDirectRateLimiter;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// A deferred change to the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Replace the sustained rate
    Rate(Rate),
    /// Replace the burst size
    Burst(NonZeroU32),
}

struct AdmissionState {
    rate: Rate,
    burst: NonZeroU32,
    // None while unlimited
    bucket: Option<Arc<DefaultDirectRateLimiter>>,
    generation: u64,
    trigger: Option<Instant>,
    pending: Vec<Adjustment>,
}

impl AdmissionState {
    fn build_bucket(&self) -> Option<Arc<DefaultDirectRateLimiter>> {
        self.rate
            .quota(self.burst)
            .map(|quota| Arc::new(DefaultDirectRateLimiter::direct(quota)))
    }

    /// Replace the bucket with an empty one at the current rate and burst.
    fn rebuild_drained(&mut self) {
        let bucket = self.build_bucket();
        if let Some(bucket) = &bucket {
            // A fresh bucket holds exactly `burst` cells
            let _ = bucket.check_n(self.burst);
        }
        self.bucket = bucket;
        self.generation += 1;
    }

    /// Fire every pending adjustment if the trigger has been reached.
    ///
    /// Returns whether the bucket was replaced.
    fn apply_due(&mut self, now: Instant) -> bool {
        let Some(trigger) = self.trigger else {
            return false;
        };
        if now < trigger {
            return false;
        }
        for adjustment in self.pending.drain(..) {
            match adjustment {
                Adjustment::Rate(rate) => self.rate = rate,
                Adjustment::Burst(burst) => self.burst = burst,
            }
        }
        self.trigger = None;
        self.rebuild_drained();
        debug!(
            rate = %self.rate,
            burst = self.burst.get(),
            generation = self.generation,
            "Applied scheduled limiter adjustments"
        );
        true
    }
}

/// Token-bucket admission control with scheduled rate and burst changes.
///
/// Every parked call re-queues at once when a scheduled adjustment fires, so
/// widening the bucket can release a burst of waiters together.
///
/// # Example
///
/// ```
/// use courier_rate_limit::{AdaptiveRateLimiter, Rate};
/// use std::num::NonZeroU32;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = AdaptiveRateLimiter::new(
///     Rate::per(NonZeroU32::new(10).unwrap(), Duration::from_secs(1)),
///     NonZeroU32::new(2).unwrap(),
/// );
/// limiter.wait(&CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct AdaptiveRateLimiter {
    state: Mutex<AdmissionState>,
    // Wakes parked waiters when the schedule or the bucket changes
    changed: Notify,
}

impl std::fmt::Debug for AdaptiveRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("AdaptiveRateLimiter")
            .field("rate", &state.rate)
            .field("burst", &state.burst)
            .field("generation", &state.generation)
            .field("trigger", &state.trigger)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl AdaptiveRateLimiter {
    /// Create a limiter admitting `rate` with bursts of up to `burst`.
    pub fn new(rate: Rate, burst: NonZeroU32) -> Self {
        let mut state = AdmissionState {
            rate,
            burst,
            bucket: None,
            generation: 0,
            trigger: None,
            pending: Vec::new(),
        };
        state.bucket = state.build_bucket();
        debug!(%rate, burst = burst.get(), "Creating adaptive rate limiter");
        Self {
            state: Mutex::new(state),
            changed: Notify::new(),
        }
    }

    /// Create a limiter that never blocks (infinite rate, burst 1).
    pub fn unlimited() -> Self {
        Self::new(Rate::Unlimited, NonZeroU32::MIN)
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until one unit of capacity is available.
    ///
    /// Due scheduled adjustments are applied first, including ones whose
    /// trigger passes while the call is parked. A call parked on a bucket that
    /// gets replaced queues again on the new one. Returns a
    /// [`CancelledError`] as soon as `cancel` fires; capacity already consumed
    /// is not returned.
    #[instrument(skip_all)]
    pub async fn wait(&self, cancel: &CancellationToken) -> CourierResult<()> {
        if cancel.is_cancelled() {
            return Err(CancelledError::new(SuspendPoint::Admission).into());
        }

        loop {
            let changed = self.changed.notified();
            let (bucket, generation, trigger, rebuilt) = {
                let mut state = self.lock();
                let rebuilt = state.apply_due(Instant::now());
                (state.bucket.clone(), state.generation, state.trigger, rebuilt)
            };
            if rebuilt {
                self.changed.notify_waiters();
            }

            let Some(bucket) = bucket else {
                return Ok(());
            };
            let trigger_reached = async move {
                match trigger {
                    Some(at) => tokio::time::sleep_until(at.into()).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancelled while waiting for admission");
                    return Err(CancelledError::new(SuspendPoint::Admission).into());
                }
                _ = changed => {}
                _ = trigger_reached => {}
                _ = bucket.until_ready() => {
                    if self.lock().generation == generation {
                        debug!("Admission granted");
                        return Ok(());
                    }
                    debug!("Bucket replaced while waiting, queueing again");
                }
            }
        }
    }

    /// Schedule a new burst size, taking effect at `at`.
    ///
    /// A burst of zero is treated as one.
    pub fn schedule_burst(&self, at: Instant, burst: u32) {
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        self.schedule(at, Adjustment::Burst(burst));
    }

    /// Schedule a new rate, taking effect at `at`.
    pub fn schedule_rate(&self, at: Instant, rate: Rate) {
        self.schedule(at, Adjustment::Rate(rate));
    }

    fn schedule(&self, at: Instant, adjustment: Adjustment) {
        {
            let mut state = self.lock();
            state.trigger = Some(at);
            state.pending.push(adjustment);
            debug!(?adjustment, pending = state.pending.len(), "Scheduled limiter adjustment");
        }
        self.changed.notify_waiters();
    }

    /// Follow the quota a service reported in its response headers.
    ///
    /// Schedules the reported limit, spread over the reported window (or
    /// `fallback_window`), as the new rate at the reported reset time. Does
    /// nothing when the reported rate is already current or already queued.
    pub fn adapt(&self, snapshot: &RateLimitSnapshot, fallback_window: Option<Duration>) {
        let Some(limit) = NonZeroU32::new(snapshot.limit) else {
            return;
        };
        let Some(window) = snapshot.window.or(fallback_window) else {
            debug!("No window known for reported rate limit, not adapting");
            return;
        };
        let rate = Rate::per(limit, window);

        {
            let state = self.lock();
            let queued = state
                .pending
                .iter()
                .rev()
                .find_map(|a| match a {
                    Adjustment::Rate(r) => Some(*r),
                    Adjustment::Burst(_) => None,
                })
                .unwrap_or(state.rate);
            if queued == rate {
                return;
            }
        }

        let Some(at) = instant_at(snapshot.reset_at) else {
            debug!(reset_at = ?snapshot.reset_at, "Reset time out of range, not adapting");
            return;
        };
        self.schedule_rate(at, rate);
    }

    /// Current sustained rate.
    pub fn rate(&self) -> Rate {
        self.lock().rate
    }

    /// Current burst size.
    pub fn burst(&self) -> NonZeroU32 {
        self.lock().burst
    }

    /// Adjustments waiting for the trigger.
    pub fn pending(&self) -> Vec<Adjustment> {
        self.lock().pending.clone()
    }

    /// Instant at which pending adjustments fire.
    pub fn trigger(&self) -> Option<Instant> {
        self.lock().trigger
    }
}

impl Default for AdaptiveRateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Map a wall-clock reset time onto the monotonic clock; past times map to now.
///
/// `None` when the time lies beyond what the monotonic clock can represent.
fn instant_at(reset_at: SystemTime) -> Option<Instant> {
    let now = Instant::now();
    match reset_at.duration_since(SystemTime::now()) {
        Ok(ahead) => now.checked_add(ahead),
        Err(_) => Some(now),
    }
}
