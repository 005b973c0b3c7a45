//! Error types for Courier.
//!
//! This crate provides the error taxonomy shared by every stage of the request
//! execution pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - each category is a struct carrying its details plus the source location
//!   it was raised from (`#[track_caller]`)
//! - `CourierErrorKind` enumerates the categories
//! - `CourierError` boxes the kind and is what public APIs return
//!
//! # Examples
//!
//! ```
//! use courier_error::{CourierResult, TransportError, TransportErrorKind};
//!
//! fn fetch() -> CourierResult<String> {
//!     Err(TransportError::new(TransportErrorKind::Connect, "connection refused"))?
//! }
//!
//! let err = fetch().unwrap_err();
//! assert!(err.is_transport());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admission;
mod breaker;
mod cancelled;
mod config;
mod decode;
mod error;
mod hook;
mod option;
mod request;
mod retryable;
mod service;
mod transport;

pub use admission::AdmissionError;
pub use breaker::{BreakerOpenError, BreakerRejection};
pub use cancelled::{CancelledError, SuspendPoint};
pub use config::ConfigError;
pub use decode::DecodeError;
pub use error::{CourierError, CourierErrorKind, CourierResult};
pub use hook::{HookError, HookStage};
pub use option::OptionApplyError;
pub use request::{RequestBuildError, RequestBuildErrorKind};
pub use retryable::RetryableError;
pub use service::ServiceError;
pub use transport::{TransportError, TransportErrorKind};
