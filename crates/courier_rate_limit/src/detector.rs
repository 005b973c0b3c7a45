//! Detection of service-reported rate limits from response headers.
//!
//! Many APIs report their quota on every response:
//! - `x-ratelimit-limit`: requests allowed in the current window
//! - `x-ratelimit-remaining`: requests remaining
//! - `x-ratelimit-reset`: when the window resets
//!
//! The reset header is either a Unix timestamp or a number of seconds from
//! now; values large enough to be a timestamp are treated as one.

use courier_core::ApiResponse;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

// Anything above this is a Unix timestamp rather than a delay (≈ 2001-09-09).
const TIMESTAMP_THRESHOLD: u64 = 1_000_000_000;

/// Quota reported by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Requests allowed per window
    pub limit: u32,
    /// Requests remaining in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset_at: SystemTime,
    /// Window length, when the service reports it
    pub window: Option<Duration>,
}

/// Extracts a [`RateLimitSnapshot`] from a response.
///
/// Implemented for any `Fn(&ApiResponse) -> Option<RateLimitSnapshot>`, so a
/// closure can be installed for services with unusual headers.
pub trait RateLimitParser: Send + Sync {
    /// Parse the quota, `None` when the response carries none.
    fn parse(&self, response: &ApiResponse) -> Option<RateLimitSnapshot>;
}

impl<F> RateLimitParser for F
where
    F: Fn(&ApiResponse) -> Option<RateLimitSnapshot> + Send + Sync,
{
    fn parse(&self, response: &ApiResponse) -> Option<RateLimitSnapshot> {
        self(response)
    }
}

/// Detects and caches rate limits from response headers.
///
/// # Example
///
/// ```
/// use courier_core::ApiResponse;
/// use courier_rate_limit::{HeaderRateLimitDetector, RateLimitParser};
/// use reqwest::StatusCode;
///
/// let detector = HeaderRateLimitDetector::new();
/// let response = ApiResponse::new(StatusCode::OK, "")
///     .with_header("x-ratelimit-limit", "60")
///     .with_header("x-ratelimit-remaining", "59")
///     .with_header("x-ratelimit-reset", "30");
///
/// let snapshot = detector.parse(&response).unwrap();
/// assert_eq!(snapshot.limit, 60);
/// assert_eq!(detector.cached(), Some(snapshot));
/// ```
#[derive(Debug, Clone)]
pub struct HeaderRateLimitDetector {
    limit_header: String,
    remaining_header: String,
    reset_header: String,
    window: Option<Duration>,
    detected: Arc<RwLock<Option<RateLimitSnapshot>>>,
}

impl HeaderRateLimitDetector {
    /// Detector for the common `x-ratelimit-*` headers.
    pub fn new() -> Self {
        Self::with_headers("x-ratelimit-limit", "x-ratelimit-remaining", "x-ratelimit-reset")
    }

    /// Detector for custom header names.
    pub fn with_headers(
        limit: impl Into<String>,
        remaining: impl Into<String>,
        reset: impl Into<String>,
    ) -> Self {
        Self {
            limit_header: limit.into(),
            remaining_header: remaining.into(),
            reset_header: reset.into(),
            window: None,
            detected: Arc::new(RwLock::new(None)),
        }
    }

    /// Report a fixed window length with every snapshot.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Most recently detected quota.
    pub fn cached(&self) -> Option<RateLimitSnapshot> {
        *self.detected.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget the cached quota.
    pub fn clear_cache(&self) {
        *self.detected.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for HeaderRateLimitDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitParser for HeaderRateLimitDetector {
    #[instrument(skip_all)]
    fn parse(&self, response: &ApiResponse) -> Option<RateLimitSnapshot> {
        let limit = parse_header_u64(response, &self.limit_header)?;
        let remaining = parse_header_u64(response, &self.remaining_header)?;
        let reset = parse_header_u64(response, &self.reset_header)?;

        let reset_at = if reset >= TIMESTAMP_THRESHOLD {
            UNIX_EPOCH.checked_add(Duration::from_secs(reset))
        } else {
            SystemTime::now().checked_add(Duration::from_secs(reset))
        };
        let Some(reset_at) = reset_at else {
            debug!(reset, "Reset time out of range, ignoring rate limit headers");
            return None;
        };

        let snapshot = RateLimitSnapshot {
            limit: u32::try_from(limit).unwrap_or(u32::MAX),
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            reset_at,
            window: self.window,
        };
        debug!(limit, remaining, reset, "Detected rate limit from headers");

        *self.detected.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        Some(snapshot)
    }
}

/// Helper to parse u64 from header value.
fn parse_header_u64(response: &ApiResponse, key: &str) -> Option<u64> {
    response.header(key)?.trim().parse().ok()
}
