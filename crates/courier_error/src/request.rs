//! Request construction errors.

/// Specific request construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RequestBuildErrorKind {
    /// Address could not be resolved
    #[display("Invalid URL: {}", _0)]
    InvalidUrl(String),
    /// Request payload could not be encoded
    #[display("Failed to encode request payload: {}", _0)]
    Encode(String),
    /// Body is a stream and cannot be buffered for replay
    #[display("Request body cannot be buffered for replay")]
    UnreplayableBody,
}

/// The outgoing request could not be built.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Request Build Error: {} at line {} in {}", kind, line, file)]
pub struct RequestBuildError {
    kind: RequestBuildErrorKind,
    line: u32,
    file: &'static str,
}

impl RequestBuildError {
    /// Create a new request build error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RequestBuildErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RequestBuildErrorKind {
        &self.kind
    }
}
