//! Request option errors.

/// A per-call request option could not be applied.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Option Error ({}): {} at line {} in {}", option, message, line, file)]
pub struct OptionApplyError {
    /// Name of the option that failed
    pub option: &'static str,
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl OptionApplyError {
    /// Create a new OptionApplyError at the current location.
    #[track_caller]
    pub fn new(option: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            option,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
