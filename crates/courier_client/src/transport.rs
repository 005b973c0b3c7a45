//! HTTP transports.

use crate::HttpRequest;
use async_trait::async_trait;
use courier_core::ApiResponse;
use courier_error::{ConfigError, CourierResult, TransportError, TransportErrorKind};
use std::time::Duration;
use tracing::{debug, instrument};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_MAX_IDLE_PER_HOST: usize = 50;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Sends one request and returns the fully buffered response.
///
/// Implementations must read the body before returning so the connection is
/// back in the pool by the time the pipeline inspects the response. Any HTTP
/// status is a successful send; `Err` is reserved for failures below the
/// application layer.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Perform a single attempt.
    async fn send(&self, request: HttpRequest) -> CourierResult<ApiResponse>;
}

/// Pooled [`reqwest`] transport.
///
/// Defaults: 2 s connect timeout, 50 idle connections per host kept for 30 s,
/// 45 s overall request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with the default pool tuning.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new() -> CourierResult<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Transport with the default pool tuning and a custom overall timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> CourierResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: HttpRequest) -> CourierResult<ApiResponse> {
        let (method, url, headers, body) = request.into_parts();
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(transport_error)?;
        debug!(%status, bytes = body.len(), "Response received");

        Ok(ApiResponse::from_parts(status, version, headers, Some(url), body))
    }
}

fn transport_error(e: reqwest::Error) -> courier_error::CourierError {
    let kind = if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_body() || e.is_decode() {
        TransportErrorKind::Body
    } else if e.is_request() {
        TransportErrorKind::Request
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, e.to_string()).into()
}
