//! Breaker configuration.

use courier_error::{ConfigError, CourierResult};
use std::time::Duration;

/// Thresholds for a [`ConsecutiveFailureBreaker`](super::ConsecutiveFailureBreaker).
///
/// # Example
///
/// ```
/// use courier_resilience::BreakerSettingsBuilder;
/// use std::time::Duration;
///
/// let settings = BreakerSettingsBuilder::default()
///     .name("cat-facts")
///     .consecutive_failures(3u32)
///     .open_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(*settings.half_open_max_requests(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct BreakerSettings {
    /// Name used in rejections and log lines.
    #[builder(default = "String::from(\"default\")")]
    name: String,
    /// Consecutive transport failures that trip the breaker.
    #[builder(default = "5")]
    consecutive_failures: u32,
    /// How long the breaker stays open before admitting trial calls.
    #[builder(default = "Duration::from_secs(60)")]
    open_timeout: Duration,
    /// Trial calls admitted concurrently while half-open.
    #[builder(default = "1")]
    half_open_max_requests: u32,
}

impl BreakerSettingsBuilder {
    /// Build the settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a threshold is zero.
    pub fn build(&self) -> CourierResult<BreakerSettings> {
        let settings = self
            .build_internal()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        if settings.consecutive_failures == 0 {
            return Err(ConfigError::new("consecutive_failures must be at least 1").into());
        }
        if settings.half_open_max_requests == 0 {
            return Err(ConfigError::new("half_open_max_requests must be at least 1").into());
        }
        Ok(settings)
    }
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            consecutive_failures: 5,
            open_timeout: Duration::from_secs(60),
            half_open_max_requests: 1,
        }
    }
}
