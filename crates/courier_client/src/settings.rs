//! File- and environment-based client settings.
//!
//! Settings are read through the `config` crate. [`ClientSettings::load`]
//! merges, lowest precedence first:
//! - `~/.config/courier/courier.toml`
//! - `./courier.toml`
//! - `COURIER__*` environment variables (`COURIER__RETRY__MAX_ATTEMPTS=5`)
//!
//! ```toml
//! base_url = "https://catfact.ninja"
//! timeout_secs = 30
//!
//! [headers]
//! accept = "application/json"
//!
//! [rate_limit]
//! limit = 10
//! burst = 2
//! window_ms = 1000
//!
//! [retry]
//! max_attempts = 3
//! min_wait_ms = 200
//! max_wait_ms = 2000
//! retry_on_status = [429, 503]
//! retry_on_transport_error = true
//!
//! [circuit_breaker]
//! name = "cat-facts"
//! consecutive_failures = 5
//! open_timeout_secs = 60
//! ```

use crate::ClientBuilder;
use config::{Config, Environment, File, FileFormat};
use courier_error::{ConfigError, CourierError, CourierResult};
use courier_rate_limit::HeaderRateLimitDetector;
use courier_resilience::retry::conditions::{on_status, on_transport_error};
use courier_resilience::{BreakerSettingsBuilder, RetryPolicy, RetryScope};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// `[rate_limit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSection {
    /// Calls admitted per window
    pub limit: u32,
    /// Burst size
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Follow `x-ratelimit-*` headers reported by the service
    #[serde(default)]
    pub adapt_from_headers: bool,
}

/// `[retry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySection {
    /// Transport attempts per sequence, including the first
    pub max_attempts: u32,
    /// Smallest backoff in milliseconds
    pub min_wait_ms: u64,
    /// Largest backoff in milliseconds
    pub max_wait_ms: u64,
    /// Statuses that trigger a retry
    #[serde(default)]
    pub retry_on_status: Vec<u16>,
    /// Retry on transport failures
    #[serde(default)]
    pub retry_on_transport_error: bool,
    /// Attempt counter scope
    #[serde(default)]
    pub scope: RetryScope,
}

/// `[circuit_breaker]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSection {
    /// Breaker name
    #[serde(default = "default_breaker_name")]
    pub name: String,
    /// Consecutive failures that trip the breaker
    #[serde(default = "default_consecutive_failures")]
    pub consecutive_failures: u32,
    /// Seconds the breaker stays open
    #[serde(default = "default_open_timeout_secs")]
    pub open_timeout_secs: u64,
    /// Concurrent trial calls while half-open
    #[serde(default = "default_half_open_max_requests")]
    pub half_open_max_requests: u32,
}

fn default_burst() -> u32 {
    1
}

fn default_breaker_name() -> String {
    "default".to_string()
}

fn default_consecutive_failures() -> u32 {
    5
}

fn default_open_timeout_secs() -> u64 {
    60
}

fn default_half_open_max_requests() -> u32 {
    1
}

/// Serializable client settings.
///
/// # Example
///
/// ```
/// use courier_client::ClientSettings;
///
/// # fn main() -> courier_error::CourierResult<()> {
/// let settings = ClientSettings::from_toml_str(
///     r#"
///     base_url = "https://catfact.ninja"
///
///     [retry]
///     max_attempts = 3
///     min_wait_ms = 100
///     max_wait_ms = 1000
///     retry_on_status = [429]
///     "#,
/// )?;
/// assert_eq!(settings.retry.as_ref().map(|r| r.max_attempts), Some(3));
/// let _client = settings.into_builder()?.build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Dump responses through tracing
    #[serde(default)]
    pub debug: bool,
    /// Default headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Overall transport timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Admission control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitSection>,
    /// Retry policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySection>,
    /// Circuit breaker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<BreakerSection>,
}

impl ClientSettings {
    /// Load settings from one file. The format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CourierResult<Self> {
        debug!("Loading client settings from file");
        Self::deserialize_from(Config::builder().add_source(File::from(path.as_ref())))
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or does not match the
    /// settings layout.
    pub fn from_toml_str(text: &str) -> CourierResult<Self> {
        Self::deserialize_from(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    /// Merge the home directory file, the working directory file and the
    /// environment. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a present source cannot be parsed.
    #[instrument]
    pub fn load() -> CourierResult<Self> {
        debug!("Loading client settings with precedence: env > current dir > home dir");

        let mut builder = Config::builder();
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/courier/courier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }
        builder = builder
            .add_source(File::with_name("courier").required(false))
            .add_source(
                Environment::with_prefix("COURIER")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::deserialize_from(builder)
    }

    fn deserialize_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> CourierResult<Self> {
        builder
            .build()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to read client settings: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to parse client settings: {}",
                    e
                )))
            })
    }

    /// Translate the settings into a client builder.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown status codes, inverted
    /// retry bounds, or breaker thresholds of zero.
    pub fn into_builder(self) -> CourierResult<ClientBuilder> {
        let mut builder = ClientBuilder::default()
            .debug(self.debug)
            .headers(self.headers);

        if let Some(base_url) = self.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(rate_limit) = self.rate_limit {
            builder = builder.rate_limit(
                rate_limit.limit,
                rate_limit.burst,
                Duration::from_millis(rate_limit.window_ms),
            );
            if rate_limit.adapt_from_headers {
                builder = builder.rate_limit_parser(HeaderRateLimitDetector::new());
            }
        }

        if let Some(retry) = self.retry {
            if retry.min_wait_ms > retry.max_wait_ms {
                return Err(ConfigError::new(format!(
                    "retry min_wait_ms ({}) exceeds max_wait_ms ({})",
                    retry.min_wait_ms, retry.max_wait_ms
                ))
                .into());
            }
            let mut policy = RetryPolicy::new(
                retry.max_attempts,
                Duration::from_millis(retry.min_wait_ms),
                Duration::from_millis(retry.max_wait_ms),
            )
            .scope(retry.scope);
            for code in retry.retry_on_status {
                let status = StatusCode::from_u16(code)
                    .map_err(|e| ConfigError::new(format!("Invalid retry status {}: {}", code, e)))?;
                policy = policy.condition(on_status(status));
            }
            if retry.retry_on_transport_error {
                policy = policy.condition(on_transport_error());
            }
            builder = builder.retry(policy);
        }

        if let Some(breaker) = self.circuit_breaker {
            let settings = BreakerSettingsBuilder::default()
                .name(breaker.name)
                .consecutive_failures(breaker.consecutive_failures)
                .open_timeout(Duration::from_secs(breaker.open_timeout_secs))
                .half_open_max_requests(breaker.half_open_max_requests)
                .build()?;
            builder = builder.circuit_breaker(settings);
        }

        Ok(builder)
    }
}
