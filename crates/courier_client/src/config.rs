//! Client configuration.

use crate::{Client, HttpTransport, ReqwestTransport};
use courier_core::{Codec, JsonCodec};
use courier_error::{ConfigError, CourierResult};
use courier_rate_limit::{AdaptiveRateLimiter, Rate, RateLimitParser};
use courier_resilience::{
    BackoffRetryController, BreakerSettings, CircuitBreaker, ConsecutiveFailureBreaker,
    NoBreaker, RetryPolicy, RetryScope,
};
use derive_getters::Getters;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Immutable per-client configuration, shared by every call.
#[derive(Getters)]
pub struct ClientConfig<C: Codec = JsonCodec> {
    /// Address that call paths are resolved against
    base_url: Option<Url>,
    /// Headers sent with every request
    headers: HeaderMap,
    /// Transport performing the attempts
    transport: Arc<dyn HttpTransport>,
    /// Dump every response through tracing
    debug: bool,
    /// Admission control
    limiter: AdaptiveRateLimiter,
    /// Window used to interpret reported limits that carry none
    rate_limit_window: Option<Duration>,
    /// Reads quota headers from final responses
    rate_limit_parser: Option<Arc<dyn RateLimitParser>>,
    /// Retry template; calls are attempted once when absent
    retry: Option<RetryPolicy>,
    /// Client-wide controller for [`RetryScope::Shared`]
    shared_retry: Option<BackoffRetryController>,
    /// Breaker wrapping each attempt
    breaker: Arc<dyn CircuitBreaker>,
    /// Payload codec
    codec: C,
}

impl<C: Codec> std::fmt::Debug for ClientConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers.len())
            .field("transport", &self.transport)
            .field("debug", &self.debug)
            .field("limiter", &self.limiter)
            .field("rate_limit_parser", &self.rate_limit_parser.is_some())
            .field("retry", &self.retry)
            .field("breaker", &self.breaker.name())
            .field("codec", &std::any::type_name::<C>())
            .finish()
    }
}

enum BreakerChoice {
    Settings(BreakerSettings),
    Custom(Arc<dyn CircuitBreaker>),
}

/// Builder for a [`Client`].
///
/// Every option is optional. Without any the client sends each call once,
/// unthrottled, through a pooled [`ReqwestTransport`].
///
/// # Example
///
/// ```
/// use courier_client::Client;
/// use courier_resilience::{BreakerSettings, RetryPolicy};
/// use courier_resilience::retry::conditions::on_server_error;
/// use std::time::Duration;
///
/// # fn main() -> courier_error::CourierResult<()> {
/// let client = Client::builder()
///     .base_url("https://catfact.ninja")
///     .header("accept", "application/json")
///     .rate_limit(10, 1, Duration::from_secs(1))
///     .retry(
///         RetryPolicy::new(3, Duration::from_millis(200), Duration::from_secs(2))
///             .condition(on_server_error()),
///     )
///     .circuit_breaker(BreakerSettings::default())
///     .build()?;
/// assert!(client.config().retry().is_some());
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder<C: Codec = JsonCodec> {
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn HttpTransport>>,
    timeout: Option<Duration>,
    debug: bool,
    rate_limit: Option<(u32, u32, Duration)>,
    rate_limit_parser: Option<Arc<dyn RateLimitParser>>,
    retry: Option<RetryPolicy>,
    breaker: Option<BreakerChoice>,
    codec: C,
}

impl Default for ClientBuilder<JsonCodec> {
    fn default() -> Self {
        Self {
            base_url: None,
            headers: Vec::new(),
            transport: None,
            timeout: None,
            debug: false,
            rate_limit: None,
            rate_limit_parser: None,
            retry: None,
            breaker: None,
            codec: JsonCodec,
        }
    }
}

impl<C: Codec> std::fmt::Debug for ClientBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("rate_limit", &self.rate_limit)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<C: Codec> ClientBuilder<C> {
    /// Address that call paths are resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Transport used for every attempt.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Overall timeout of the default transport. Ignored with a custom one.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a default header. Repeating a name sends every value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several default headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Dump every response through tracing (target `courier::dump`).
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Admit `limit` calls per `window`, allowing bursts of `burst`.
    pub fn rate_limit(mut self, limit: u32, burst: u32, window: Duration) -> Self {
        self.rate_limit = Some((limit, burst, window));
        self
    }

    /// Follow quotas reported by the service.
    pub fn rate_limit_parser(mut self, parser: impl RateLimitParser + 'static) -> Self {
        self.rate_limit_parser = Some(Arc::new(parser));
        self
    }

    /// Retry attempts according to `policy`.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Protect attempts with a [`ConsecutiveFailureBreaker`].
    pub fn circuit_breaker(mut self, settings: BreakerSettings) -> Self {
        self.breaker = Some(BreakerChoice::Settings(settings));
        self
    }

    /// Protect attempts with a custom breaker.
    pub fn breaker(mut self, breaker: Arc<dyn CircuitBreaker>) -> Self {
        self.breaker = Some(BreakerChoice::Custom(breaker));
        self
    }

    /// Replace the payload codec.
    pub fn codec<D: Codec>(self, codec: D) -> ClientBuilder<D> {
        ClientBuilder {
            base_url: self.base_url,
            headers: self.headers,
            transport: self.transport,
            timeout: self.timeout,
            debug: self.debug,
            rate_limit: self.rate_limit,
            rate_limit_parser: self.rate_limit_parser,
            retry: self.retry,
            breaker: self.breaker,
            codec,
        }
    }

    /// Validate the options and build the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparsable base address, invalid
    /// default headers, a zero rate limit, burst or window, a retry policy
    /// allowing no attempts, or a transport that cannot be initialised.
    #[instrument(skip(self), fields(base_url = ?self.base_url))]
    pub fn build(self) -> CourierResult<Client<C>> {
        let base_url = self.base_url.as_deref().map(parse_base_url).transpose()?;
        let headers = header_map(&self.headers)?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => match self.timeout {
                Some(timeout) => Arc::new(ReqwestTransport::with_timeout(timeout)?),
                None => Arc::new(ReqwestTransport::new()?),
            },
        };

        let (limiter, rate_limit_window) = match self.rate_limit {
            Some((limit, burst, window)) => {
                let limit = NonZeroU32::new(limit)
                    .ok_or_else(|| ConfigError::new("rate limit must allow at least one call"))?;
                let burst = NonZeroU32::new(burst)
                    .ok_or_else(|| ConfigError::new("rate limit burst must be at least 1"))?;
                if window.is_zero() {
                    return Err(ConfigError::new("rate limit window must be non-zero").into());
                }
                (
                    AdaptiveRateLimiter::new(Rate::per(limit, window), burst),
                    Some(window),
                )
            }
            None => (AdaptiveRateLimiter::unlimited(), None),
        };

        if self.retry.as_ref().is_some_and(|policy| policy.max_attempts() == 0) {
            return Err(ConfigError::new("retry max_attempts must be at least 1").into());
        }
        let shared_retry = self
            .retry
            .as_ref()
            .filter(|policy| policy.retry_scope() == RetryScope::Shared)
            .map(RetryPolicy::controller);

        let breaker: Arc<dyn CircuitBreaker> = match self.breaker {
            Some(BreakerChoice::Settings(settings)) => {
                Arc::new(ConsecutiveFailureBreaker::new(settings))
            }
            Some(BreakerChoice::Custom(breaker)) => breaker,
            None => Arc::new(NoBreaker),
        };

        debug!(
            rate = %limiter.rate(),
            retry = self.retry.is_some(),
            breaker = breaker.name(),
            "Client configured"
        );

        Ok(Client::from_config(ClientConfig {
            base_url,
            headers,
            transport,
            debug: self.debug,
            limiter,
            rate_limit_window,
            rate_limit_parser: self.rate_limit_parser,
            retry: self.retry,
            shared_retry,
            breaker,
            codec: self.codec,
        }))
    }
}

/// Parse a base address so relative paths join below it.
fn parse_base_url(raw: &str) -> CourierResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| ConfigError::new(format!("Invalid base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::new(format!("Base URL '{}' cannot hold paths", raw)).into());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn header_map(headers: &[(String, String)]) -> CourierResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::new(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ConfigError::new(format!("Invalid value for header '{}': {}", name, e)))?;
        map.append(header, value);
    }
    Ok(map)
}
