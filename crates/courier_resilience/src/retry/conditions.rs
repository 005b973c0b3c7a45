//! Ready-made retry conditions.

use super::RetryCondition;
use courier_error::RetryableError;
use reqwest::StatusCode;
use std::sync::Arc;

/// Retry when the response has this status.
pub fn on_status(status: StatusCode) -> RetryCondition {
    Arc::new(move |outcome| matches!(outcome, Ok(response) if *response.status() == status))
}

/// Retry on any 5xx response.
pub fn on_server_error() -> RetryCondition {
    Arc::new(|outcome| matches!(outcome, Ok(response) if response.status().is_server_error()))
}

/// Retry on transport failures.
pub fn on_transport_error() -> RetryCondition {
    Arc::new(|outcome| matches!(outcome, Err(e) if e.is_transport()))
}

/// Retry on errors classified as transient by [`RetryableError`].
pub fn on_retryable() -> RetryCondition {
    Arc::new(|outcome| matches!(outcome, Err(e) if e.is_retryable()))
}

/// Retry when the circuit breaker refused the call.
///
/// Breaker rejections are never retried unless this condition is installed.
pub fn on_breaker_open() -> RetryCondition {
    Arc::new(|outcome| matches!(outcome, Err(e) if e.is_breaker_open()))
}
