//! Top-level error wrapper types.

use crate::{
    AdmissionError, BreakerOpenError, CancelledError, ConfigError, DecodeError, HookError,
    OptionApplyError, RequestBuildError, ServiceError, TransportError,
};

/// Every failure a logical call can end with.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierError, DecodeError};
///
/// let err: CourierError = DecodeError::new("expected value at line 1").into();
/// assert!(format!("{}", err).contains("Decode Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CourierErrorKind {
    /// Cancellation fired at a suspension point
    #[from(CancelledError)]
    Cancelled(CancelledError),
    /// Limiter-level failure
    #[from(AdmissionError)]
    Admission(AdmissionError),
    /// Network or transport failure below the application layer
    #[from(TransportError)]
    Transport(TransportError),
    /// Circuit breaker refused the call
    #[from(BreakerOpenError)]
    BreakerOpen(BreakerOpenError),
    /// Response body could not be decoded into the target type
    #[from(DecodeError)]
    Decode(DecodeError),
    /// Error-sniffing or post-response hook failed
    #[from(HookError)]
    Hook(HookError),
    /// A per-call request option failed
    #[from(OptionApplyError)]
    OptionApply(OptionApplyError),
    /// The outgoing request could not be constructed
    #[from(RequestBuildError)]
    RequestBuild(RequestBuildError),
    /// The service reported a domain error
    #[from(ServiceError)]
    Service(ServiceError),
    /// Client configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Courier error with kind discrimination.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierError, CourierResult, ConfigError};
///
/// fn might_fail() -> CourierResult<()> {
///     Err(ConfigError::new("base_url is not a valid URL"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Courier Error: {}", _0)]
pub struct CourierError(Box<CourierErrorKind>);

impl CourierError {
    /// Create a new error from a kind.
    pub fn new(kind: CourierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CourierErrorKind {
        &self.0
    }

    /// Consume the error and return its kind.
    pub fn into_kind(self) -> CourierErrorKind {
        *self.0
    }

    /// True when the call was aborted by its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind(), CourierErrorKind::Cancelled(_))
    }

    /// True for transport-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), CourierErrorKind::Transport(_))
    }

    /// True when the circuit breaker refused the call.
    pub fn is_breaker_open(&self) -> bool {
        matches!(self.kind(), CourierErrorKind::BreakerOpen(_))
    }

    /// True when the response body could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind(), CourierErrorKind::Decode(_))
    }
}

// Generic From implementation for any type that converts to CourierErrorKind
impl<T> From<T> for CourierError
where
    T: Into<CourierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Courier operations.
pub type CourierResult<T> = std::result::Result<T, CourierError>;
