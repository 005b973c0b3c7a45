//! Retry and circuit-breaking policy for Courier clients.
//!
//! - [`retry`] - backoff computation, attempt accounting and retry conditions
//! - [`breaker`] - the [`CircuitBreaker`] contract, a consecutive-failure
//!   implementation, and [`NoBreaker`] for clients without one

pub mod breaker;
pub mod retry;

pub use breaker::{
    BreakerSettings, BreakerSettingsBuilder, BreakerState, CircuitBreaker,
    ConsecutiveFailureBreaker, NoBreaker,
};
pub use retry::{
    Backoff, BackoffRetryController, DelayFn, RetryCondition, RetryPolicy, RetryScope,
    exponential_backoff,
};
