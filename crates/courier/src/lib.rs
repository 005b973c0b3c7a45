//! Courier - a resilient HTTP API client core.
//!
//! Courier is the shared execution core behind per-service API clients. A
//! service wrapper declares its endpoints; Courier owns everything between
//! "call this endpoint" and "here is the decoded payload":
//!
//! - **Admission control**: token-bucket rate limiting that can follow the
//!   quota a service reports in its headers
//! - **Retry**: exponential backoff with jitter, driven by retry conditions
//! - **Circuit breaking**: consecutive-failure breaker around each attempt
//! - **Typed requests**: `RequestBuilder<Req, Resp>` with pluggable codecs,
//!   per-call options, error sniffing and post-response hooks
//! - **Cancellation**: every suspension point honours a `CancellationToken`
//!
//! # Quick Start
//!
//! ```no_run
//! use courier::prelude::*;
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Debug, Deserialize)]
//! struct Fact {
//!     fact: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> CourierResult<()> {
//!     let client = Client::builder()
//!         .base_url("https://catfact.ninja")
//!         .rate_limit(5, 1, Duration::from_secs(1))
//!         .retry(
//!             RetryPolicy::new(3, Duration::from_millis(200), Duration::from_secs(2))
//!                 .condition(on_status(StatusCode::TOO_MANY_REQUESTS)),
//!         )
//!         .build()?;
//!
//!     let (_, fact) = client
//!         .get::<Fact>("/fact")
//!         .execute_decoding(&deadline(Duration::from_secs(10)))
//!         .await?;
//!     println!("{}", fact.fact);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod telemetry;

pub use telemetry::init_console_telemetry;

pub use courier_client::{
    AfterResponseHook, CallDescriptor, Client, ClientBuilder, ClientConfig, ClientSettings,
    ErrorSniffer, HttpRequest, HttpTransport, RequestBuilder, RequestOption, ReqwestTransport,
    deadline, options,
};
pub use courier_core::{ApiResponse, Codec, JsonCodec};
pub use courier_error::*;
pub use courier_rate_limit::{
    AdaptiveRateLimiter, HeaderRateLimitDetector, Rate, RateLimitParser, RateLimitSnapshot,
};
pub use courier_resilience::retry::conditions;
pub use courier_resilience::{
    Backoff, BackoffRetryController, BreakerSettings, BreakerSettingsBuilder, BreakerState,
    CircuitBreaker, ConsecutiveFailureBreaker, NoBreaker, RetryCondition, RetryPolicy,
    RetryScope, exponential_backoff,
};

/// Commonly used items.
pub mod prelude {
    pub use crate::conditions::*;
    pub use crate::options::{with_form, with_header, with_headers, with_query};
    pub use crate::{
        ApiResponse, BreakerSettings, Client, CourierError, CourierResult, RequestBuilder,
        RetryPolicy, RetryScope, deadline,
    };
    pub use reqwest::{Method, StatusCode};
    pub use tokio_util::sync::CancellationToken;
}
