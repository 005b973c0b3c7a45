//! Attempt accounting and delay computation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::jitter;

/// Computes the wait before the next attempt from
/// (attempt number, min wait, max wait).
pub type DelayFn = Arc<dyn Fn(u32, Duration, Duration) -> Duration + Send + Sync>;

/// Exponential backoff with jitter.
///
/// `min * 2^attempt` plus a random share of `min * attempt`, capped at `max`.
/// Every call draws fresh randomness.
///
/// # Example
///
/// ```
/// use courier_resilience::exponential_backoff;
/// use std::time::Duration;
///
/// let delay = exponential_backoff(2, Duration::from_millis(100), Duration::from_secs(10));
/// assert!(delay >= Duration::from_millis(400));
/// assert!(delay < Duration::from_millis(600));
/// ```
pub fn exponential_backoff(attempt: u32, min: Duration, max: Duration) -> Duration {
    let base = min.saturating_mul(2u32.saturating_pow(attempt));
    let spread = jitter(min.saturating_mul(attempt));
    base.saturating_add(spread).min(max)
}

/// Result of asking the controller for the next delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Sleep this long, then attempt again
    Wait(Duration),
    /// Attempts are exhausted
    Stop,
}

/// Thread-safe attempt counter with backoff computation.
///
/// The counter holds the number of [`next`](Self::next) calls since the last
/// [`reset`](Self::reset), i.e. the number of failed attempts in the current
/// sequence. `max_attempts` bounds transport attempts including the first, so
/// `next` stops once the counter reaches it.
///
/// # Example
///
/// ```
/// use courier_resilience::{Backoff, BackoffRetryController};
/// use std::time::Duration;
///
/// let controller = BackoffRetryController::new(3, Duration::from_millis(10), Duration::from_secs(1));
/// assert!(matches!(controller.next(), Backoff::Wait(_)));
/// assert!(matches!(controller.next(), Backoff::Wait(_)));
/// assert_eq!(controller.next(), Backoff::Stop);
/// assert_eq!(controller.reset(), 3);
/// ```
pub struct BackoffRetryController {
    min_wait: Duration,
    max_wait: Duration,
    max_attempts: u32,
    attempts: AtomicU32,
    delay: DelayFn,
}

impl std::fmt::Debug for BackoffRetryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffRetryController")
            .field("min_wait", &self.min_wait)
            .field("max_wait", &self.max_wait)
            .field("max_attempts", &self.max_attempts)
            .field("attempts", &self.attempt_count())
            .finish_non_exhaustive()
    }
}

impl BackoffRetryController {
    /// Controller using [`exponential_backoff`].
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self::with_delay(max_attempts, min_wait, max_wait, Arc::new(exponential_backoff))
    }

    /// Controller using a custom delay function.
    pub fn with_delay(max_attempts: u32, min_wait: Duration, max_wait: Duration, delay: DelayFn) -> Self {
        Self {
            min_wait,
            max_wait,
            max_attempts,
            attempts: AtomicU32::new(0),
            delay,
        }
    }

    /// Count one more failed attempt and return how long to wait before the
    /// next one, or [`Backoff::Stop`] when no attempts remain.
    pub fn next(&self) -> Backoff {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if attempt >= self.max_attempts {
            return Backoff::Stop;
        }
        Backoff::Wait((self.delay)(attempt, self.min_wait, self.max_wait))
    }

    /// Zero the counter, returning its previous value.
    pub fn reset(&self) -> u32 {
        self.attempts.swap(0, Ordering::SeqCst)
    }

    /// Current counter value.
    pub fn attempt_count(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Configured attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
