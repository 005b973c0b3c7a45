//! Retry policy templates.

use super::{BackoffRetryController, DelayFn, exponential_backoff};
use courier_core::ApiResponse;
use courier_error::CourierResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Predicate over one attempt's outcome deciding whether to try again.
pub type RetryCondition = Arc<dyn Fn(&CourierResult<ApiResponse>) -> bool + Send + Sync>;

/// Who shares a retry attempt budget.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RetryScope {
    /// Every logical call gets its own controller
    #[default]
    PerCall,
    /// One controller per client: concurrent calls draw on, and reset, a
    /// common attempt counter
    Shared,
}

/// Retry configuration for a client.
///
/// # Example
///
/// ```
/// use courier_resilience::RetryPolicy;
/// use courier_resilience::retry::conditions::on_status;
/// use reqwest::StatusCode;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(2))
///     .condition(on_status(StatusCode::TOO_MANY_REQUESTS));
/// assert_eq!(policy.max_attempts(), 3);
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_wait: Duration,
    max_wait: Duration,
    delay: DelayFn,
    conditions: Vec<RetryCondition>,
    scope: RetryScope,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("min_wait", &self.min_wait)
            .field("max_wait", &self.max_wait)
            .field("conditions", &self.conditions.len())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Policy with exponential backoff, no conditions and per-call scope.
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
            delay: Arc::new(exponential_backoff),
            conditions: Vec::new(),
            scope: RetryScope::default(),
        }
    }

    /// Replace the delay function.
    pub fn delay_fn<F>(mut self, delay: F) -> Self
    where
        F: Fn(u32, Duration, Duration) -> Duration + Send + Sync + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    /// Append a retry condition. Conditions are evaluated in the order added.
    pub fn condition(mut self, condition: RetryCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append several retry conditions.
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = RetryCondition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Choose who shares the attempt counter.
    pub fn scope(mut self, scope: RetryScope) -> Self {
        self.scope = scope;
        self
    }

    /// Configured attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Configured scope.
    pub fn retry_scope(&self) -> RetryScope {
        self.scope
    }

    /// Fresh controller built from this template.
    pub fn controller(&self) -> BackoffRetryController {
        BackoffRetryController::with_delay(
            self.max_attempts,
            self.min_wait,
            self.max_wait,
            Arc::clone(&self.delay),
        )
    }

    /// True if any condition matches; evaluation stops at the first match.
    pub fn should_retry(&self, outcome: &CourierResult<ApiResponse>) -> bool {
        self.conditions.iter().any(|condition| condition(outcome))
    }
}
