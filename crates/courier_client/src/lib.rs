//! Request execution pipeline for Courier clients.
//!
//! A [`Client`] owns the per-service configuration: base address, default
//! headers, transport, admission control, retry policy and circuit breaker.
//! Each logical call is described by a [`RequestBuilder`], whose terminal
//! operations hand a [`CallDescriptor`] to [`Client::execute`]:
//!
//! 1. admission through the [`AdaptiveRateLimiter`](courier_rate_limit::AdaptiveRateLimiter)
//! 2. request construction (address, payload, headers, per-call options)
//! 3. transport attempts through the breaker, retried with backoff
//! 4. error sniffing, decoding and post-response hooks
//!
//! # Example
//!
//! ```no_run
//! use courier_client::{Client, RequestBuilder};
//! use serde::Deserialize;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Deserialize)]
//! struct Fact {
//!     fact: String,
//!     length: u32,
//! }
//!
//! # async fn run() -> courier_error::CourierResult<()> {
//! let client = Client::builder().base_url("https://catfact.ninja").build()?;
//! let (_, fact) = client
//!     .get::<Fact>("/fact")
//!     .execute_decoding(&CancellationToken::new())
//!     .await?;
//! println!("{} ({} chars)", fact.fact, fact.length);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod client;
mod config;
mod descriptor;
pub mod options;
mod pipeline;
mod request;
mod settings;
mod transport;

pub use builder::RequestBuilder;
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig};
pub use descriptor::{AfterResponseHook, CallDescriptor, ErrorSniffer};
pub use options::RequestOption;
pub use pipeline::deadline;
pub use request::HttpRequest;
pub use settings::{BreakerSection, ClientSettings, RateLimitSection, RetrySection};
pub use transport::{HttpTransport, ReqwestTransport};
