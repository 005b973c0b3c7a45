//! Circuit breaker rejection errors.

/// Why the breaker refused a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BreakerRejection {
    /// The breaker is open
    #[display("circuit is open")]
    Open,
    /// The breaker is half-open and its trial quota is in use
    #[display("too many half-open trial requests")]
    TooManyTrialRequests,
}

/// The circuit breaker refused the call without invoking the transport.
///
/// Kept distinct from [`TransportError`](crate::TransportError) so callers can
/// tell "the service said no" from "the breaker said no".
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Circuit breaker '{}' rejected call: {} at line {} in {}", breaker, rejection, line, file)]
pub struct BreakerOpenError {
    /// Name of the breaker
    pub breaker: String,
    /// Rejection reason
    pub rejection: BreakerRejection,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BreakerOpenError {
    /// Create a new BreakerOpenError at the current location.
    #[track_caller]
    pub fn new(breaker: impl Into<String>, rejection: BreakerRejection) -> Self {
        let location = std::panic::Location::caller();
        Self {
            breaker: breaker.into(),
            rejection,
            line: location.line(),
            file: location.file(),
        }
    }
}
