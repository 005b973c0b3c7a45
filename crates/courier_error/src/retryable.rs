//! Transient-error classification.

use crate::{CourierError, CourierErrorKind, ServiceError, TransportError, TransportErrorKind};

/// Trait for errors that may succeed when tried again.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierError, RetryableError, ServiceError};
///
/// let err: CourierError = ServiceError::new(503, "Service unavailable").into();
/// assert!(err.is_retryable());
///
/// let err: CourierError = ServiceError::new(401, "Unauthorized").into();
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        !matches!(self.kind, TransportErrorKind::Other)
    }
}

impl RetryableError for ServiceError {
    fn is_retryable(&self) -> bool {
        matches!(self.status, 408 | 429 | 500 | 502 | 503 | 504)
    }
}

impl RetryableError for CourierError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            CourierErrorKind::Transport(e) => e.is_retryable(),
            CourierErrorKind::Service(e) => e.is_retryable(),
            _ => false,
        }
    }
}
