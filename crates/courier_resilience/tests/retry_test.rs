//! Tests for backoff computation, attempt accounting and retry conditions.

use courier_core::ApiResponse;
use courier_error::{BreakerOpenError, BreakerRejection, CourierResult, DecodeError, TransportError, TransportErrorKind};
use courier_resilience::retry::conditions::{
    on_breaker_open, on_retryable, on_server_error, on_status, on_transport_error,
};
use courier_resilience::{Backoff, BackoffRetryController, RetryPolicy, RetryScope, exponential_backoff};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn ok(status: StatusCode) -> CourierResult<ApiResponse> {
    Ok(ApiResponse::new(status, ""))
}

fn transport_failure() -> CourierResult<ApiResponse> {
    Err(TransportError::new(TransportErrorKind::Connect, "connection refused").into())
}

#[test]
fn test_backoff_grows_and_is_capped() {
    let min = Duration::from_millis(100);
    let max = Duration::from_secs(1);

    let first = exponential_backoff(1, min, max);
    assert!(first >= Duration::from_millis(200));
    assert!(first < Duration::from_millis(300));

    let third = exponential_backoff(3, min, max);
    assert!(third >= Duration::from_millis(800));

    assert_eq!(exponential_backoff(10, min, max), max);
}

#[test]
fn test_backoff_attempt_zero_has_no_jitter() {
    let min = Duration::from_millis(50);
    assert_eq!(exponential_backoff(0, min, Duration::from_secs(1)), min);
}

#[test]
fn test_controller_stops_after_max_attempts() {
    let controller =
        BackoffRetryController::new(3, Duration::from_millis(1), Duration::from_millis(10));

    assert!(matches!(controller.next(), Backoff::Wait(_)));
    assert!(matches!(controller.next(), Backoff::Wait(_)));
    assert_eq!(controller.next(), Backoff::Stop);
    assert_eq!(controller.attempt_count(), 3);
}

#[test]
fn test_controller_reset_returns_count() {
    let controller = BackoffRetryController::new(5, Duration::from_millis(1), Duration::from_millis(10));
    controller.next();
    controller.next();

    assert_eq!(controller.reset(), 2);
    assert_eq!(controller.attempt_count(), 0);
    assert!(matches!(controller.next(), Backoff::Wait(_)));
}

#[test]
fn test_reset_counts_concurrent_next_calls() {
    const THREADS: usize = 8;
    const CALLS_PER_THREAD: usize = 250;

    let controller =
        BackoffRetryController::new(u32::MAX, Duration::from_millis(1), Duration::from_millis(10));

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..CALLS_PER_THREAD {
                    assert!(matches!(controller.next(), Backoff::Wait(_)));
                }
            });
        }
    });

    assert_eq!(controller.reset() as usize, THREADS * CALLS_PER_THREAD);
    assert_eq!(controller.reset(), 0);
}

#[tokio::test]
async fn test_reset_counts_next_calls_across_tasks() {
    let controller = Arc::new(BackoffRetryController::new(
        1_000,
        Duration::from_millis(1),
        Duration::from_millis(10),
    ));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                for _ in 0..10 {
                    controller.next();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(controller.reset(), 160);
}

#[test]
fn test_single_attempt_never_waits() {
    let controller = BackoffRetryController::new(1, Duration::from_millis(1), Duration::from_millis(10));
    assert_eq!(controller.next(), Backoff::Stop);
}

#[test]
fn test_custom_delay_fn_receives_attempt() {
    let policy = RetryPolicy::new(4, Duration::from_millis(5), Duration::from_secs(1))
        .delay_fn(|attempt, min, _max| min * attempt);
    let controller = policy.controller();

    assert_eq!(controller.next(), Backoff::Wait(Duration::from_millis(5)));
    assert_eq!(controller.next(), Backoff::Wait(Duration::from_millis(10)));
    assert_eq!(controller.next(), Backoff::Wait(Duration::from_millis(15)));
    assert_eq!(controller.next(), Backoff::Stop);
}

#[test]
fn test_policy_controllers_are_independent() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10));
    let first = policy.controller();
    let second = policy.controller();

    first.next();
    first.next();

    assert_eq!(second.attempt_count(), 0);
    assert_eq!(policy.retry_scope(), RetryScope::PerCall);
}

#[test]
fn test_no_conditions_never_retries() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10));
    assert!(!policy.should_retry(&ok(StatusCode::SERVICE_UNAVAILABLE)));
    assert!(!policy.should_retry(&transport_failure()));
}

#[test]
fn test_first_matching_condition_short_circuits() {
    let evaluated = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluated);
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10))
        .condition(on_status(StatusCode::TOO_MANY_REQUESTS))
        .condition(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }));

    assert!(policy.should_retry(&ok(StatusCode::TOO_MANY_REQUESTS)));
    assert_eq!(evaluated.load(Ordering::SeqCst), 0);

    assert!(!policy.should_retry(&ok(StatusCode::OK)));
    assert_eq!(evaluated.load(Ordering::SeqCst), 1);
}

#[test]
fn test_status_conditions() {
    assert!(on_status(StatusCode::BAD_GATEWAY)(&ok(StatusCode::BAD_GATEWAY)));
    assert!(!on_status(StatusCode::BAD_GATEWAY)(&ok(StatusCode::OK)));
    assert!(on_server_error()(&ok(StatusCode::INTERNAL_SERVER_ERROR)));
    assert!(!on_server_error()(&ok(StatusCode::NOT_FOUND)));
    assert!(!on_server_error()(&transport_failure()));
}

#[test]
fn test_error_conditions() {
    let open: CourierResult<ApiResponse> =
        Err(BreakerOpenError::new("svc", BreakerRejection::Open).into());
    let decode: CourierResult<ApiResponse> = Err(DecodeError::new("bad json").into());

    assert!(on_transport_error()(&transport_failure()));
    assert!(!on_transport_error()(&open));
    assert!(on_breaker_open()(&open));
    assert!(!on_breaker_open()(&transport_failure()));
    assert!(on_retryable()(&transport_failure()));
    assert!(!on_retryable()(&decode));
}

#[test]
fn test_scope_deserializes_snake_case() {
    let scope: RetryScope = serde_json::from_str("\"shared\"").unwrap();
    assert_eq!(scope, RetryScope::Shared);
    assert_eq!(RetryScope::PerCall.to_string(), "per_call");
}
