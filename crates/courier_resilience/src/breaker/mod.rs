//! Circuit breaking.
//!
//! The pipeline always calls through a [`CircuitBreaker`]. Clients configured
//! without one get [`NoBreaker`], which runs the call and passes its outcome
//! through untouched.

mod consecutive;
mod settings;

pub use consecutive::ConsecutiveFailureBreaker;
pub use settings::{BreakerSettings, BreakerSettingsBuilder};

use async_trait::async_trait;
use courier_core::ApiResponse;
use courier_error::CourierResult;
use futures::future::BoxFuture;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BreakerState {
    /// Calls flow through
    Closed,
    /// Calls are rejected without reaching the transport
    Open,
    /// A limited number of trial calls probe the service
    HalfOpen,
}

/// Wraps one transport attempt.
///
/// Implementations decide whether to run `call` at all. A refused call must
/// fail with [`BreakerOpenError`](courier_error::BreakerOpenError) and must
/// not poll `call`. Whatever `call` resolves to is returned unchanged.
#[async_trait]
pub trait CircuitBreaker: Send + Sync + std::fmt::Debug {
    /// Name reported in rejections and logs.
    fn name(&self) -> &str;

    /// Current state.
    fn state(&self) -> BreakerState;

    /// Run `call` under the breaker.
    async fn execute(
        &self,
        call: BoxFuture<'static, CourierResult<ApiResponse>>,
    ) -> CourierResult<ApiResponse>;
}

/// Pass-through breaker that is always closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBreaker;

#[async_trait]
impl CircuitBreaker for NoBreaker {
    fn name(&self) -> &str {
        "none"
    }

    fn state(&self) -> BreakerState {
        BreakerState::Closed
    }

    async fn execute(
        &self,
        call: BoxFuture<'static, CourierResult<ApiResponse>>,
    ) -> CourierResult<ApiResponse> {
        call.await
    }
}
