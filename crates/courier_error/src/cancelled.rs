//! Cancellation error types.

/// Suspension point at which a call observed its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SuspendPoint {
    /// Waiting for rate limiter admission
    #[display("rate limiter admission")]
    Admission,
    /// Sleeping between retry attempts
    #[display("retry backoff")]
    Backoff,
    /// Waiting on the transport call
    #[display("transport call")]
    Transport,
}

/// The call's cancellation token fired while it was suspended.
///
/// # Examples
///
/// ```
/// use courier_error::{CancelledError, SuspendPoint};
///
/// let err = CancelledError::new(SuspendPoint::Admission);
/// assert_eq!(err.point, SuspendPoint::Admission);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cancelled during {} at line {} in {}", point, line, file)]
pub struct CancelledError {
    /// Where the call was suspended
    pub point: SuspendPoint,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl CancelledError {
    /// Create a new CancelledError for the given suspension point.
    #[track_caller]
    pub fn new(point: SuspendPoint) -> Self {
        let location = std::panic::Location::caller();
        Self {
            point,
            line: location.line(),
            file: location.file(),
        }
    }
}
