//! Transport error types.

/// Transport failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// Connection could not be established
    #[display("connect")]
    Connect,
    /// The request or response timed out
    #[display("timeout")]
    Timeout,
    /// Sending the request failed
    #[display("request")]
    Request,
    /// Reading the response body failed
    #[display("body")]
    Body,
    /// Anything else reported by the transport
    #[display("other")]
    Other,
}

/// Network or transport failure below the application layer.
///
/// # Examples
///
/// ```
/// use courier_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Timeout, "operation timed out");
/// assert!(format!("{}", err).contains("timeout"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error ({}): {} at line {} in {}", kind, message, line, file)]
pub struct TransportError {
    /// Failure class
    pub kind: TransportErrorKind,
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError at the current location.
    #[track_caller]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
