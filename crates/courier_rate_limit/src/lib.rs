//! Rate limiting for outbound API calls.
//!
//! This crate provides admission control for Courier clients:
//! - [`AdaptiveRateLimiter`] - a GCRA token bucket (via `governor`) whose rate
//!   and burst can be changed at a scheduled instant
//! - [`HeaderRateLimitDetector`] - reads quota headers from responses so the
//!   limiter can follow what the service reports
//!
//! ## Scheduled adjustments
//!
//! The limiter keeps a single trigger slot. Every call to
//! [`AdaptiveRateLimiter::schedule_rate`] or
//! [`AdaptiveRateLimiter::schedule_burst`] appends an adjustment and moves the
//! trigger to the newly supplied instant; all queued adjustments fire together
//! once that instant is reached. Layering independent future changes at
//! different instants is not supported.

mod detector;
mod limiter;
mod rate;

pub use detector::{HeaderRateLimitDetector, RateLimitParser, RateLimitSnapshot};
pub use limiter::{Adjustment, AdaptiveRateLimiter};
pub use rate::Rate;
