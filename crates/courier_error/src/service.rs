//! Service-reported domain errors.

/// The remote service answered, but the answer is a domain error.
///
/// Produced by error-sniffing hooks that recognise an error envelope in an
/// otherwise well-formed response.
///
/// # Examples
///
/// ```
/// use courier_error::ServiceError;
///
/// let err = ServiceError::new(404, "fact not found");
/// assert_eq!(err.status, 404);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Service Error: HTTP {} {} at line {} in {}", status, message, line, file)]
pub struct ServiceError {
    /// HTTP status code of the response
    pub status: u16,
    /// Message extracted from the response
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ServiceError {
    /// Create a new ServiceError at the current location.
    #[track_caller]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            status,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
