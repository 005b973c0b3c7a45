//! Hook failure errors.

use crate::CourierError;
use std::sync::Arc;

/// Pipeline stage a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HookStage {
    /// Error-sniffing hook, before decoding
    #[display("error sniff")]
    ErrorSniff,
    /// Post-response hook, after decoding
    #[display("after response")]
    AfterResponse,
}

/// A hook failed while processing a response.
///
/// When the hook returned an error of its own, that error is kept as the
/// [`source`](std::error::Error::source) and through [`HookError::cause`].
///
/// # Examples
///
/// ```
/// use courier_error::{CourierErrorKind, DecodeError, HookError, HookStage};
///
/// let err = HookError::new(HookStage::AfterResponse, "missing cursor");
/// assert!(format!("{}", err).contains("after response"));
///
/// let err = HookError::caused_by(HookStage::ErrorSniff, DecodeError::new("bad envelope").into());
/// assert!(matches!(err.cause().map(|e| e.kind()), Some(CourierErrorKind::Decode(_))));
/// ```
#[derive(Debug, Clone, derive_more::Display)]
#[display("Hook Error ({} exec failed): {} at line {} in {}", stage, message, line, file)]
pub struct HookError {
    /// Stage the hook belongs to
    pub stage: HookStage,
    /// The underlying error message
    pub message: String,
    /// Error returned by the hook, if any
    pub source: Option<Arc<CourierError>>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HookError {
    /// Create a new HookError at the current location.
    #[track_caller]
    pub fn new(stage: HookStage, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            message: message.into(),
            source: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wrap the error a hook returned, keeping it as the source.
    #[track_caller]
    pub fn caused_by(stage: HookStage, source: CourierError) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            message: source.to_string(),
            source: Some(Arc::new(source)),
            line: location.line(),
            file: location.file(),
        }
    }

    /// The error the hook returned.
    pub fn cause(&self) -> Option<&CourierError> {
        self.source.as_deref()
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
