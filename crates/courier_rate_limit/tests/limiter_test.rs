//! Tests for the adaptive rate limiter.

use courier_rate_limit::{AdaptiveRateLimiter, Adjustment, Rate, RateLimitSnapshot};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio_util::sync::CancellationToken;

fn nz(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

#[tokio::test]
async fn test_unlimited_never_blocks() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let cancel = CancellationToken::new();

    let start = Instant::now();
    for _ in 0..1000 {
        limiter.wait(&cancel).await.unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(limiter.rate(), Rate::Unlimited);
    assert_eq!(limiter.burst().get(), 1);
}

#[tokio::test]
async fn test_burst_admits_immediately_then_blocks() {
    let limiter = AdaptiveRateLimiter::new(Rate::per(nz(1), Duration::from_secs(60)), nz(3));
    let cancel = CancellationToken::new();

    for _ in 0..3 {
        limiter.wait(&cancel).await.unwrap();
    }

    let blocked = tokio::time::timeout(Duration::from_millis(100), limiter.wait(&cancel)).await;
    assert!(blocked.is_err(), "fourth admission should wait for the next slot");
}

#[tokio::test]
async fn test_cancellation_during_wait() {
    let limiter = Arc::new(AdaptiveRateLimiter::new(
        Rate::per(nz(1), Duration::from_secs(60)),
        nz(1),
    ));
    let cancel = CancellationToken::new();
    limiter.wait(&cancel).await.unwrap();

    let waiter = {
        let limiter = Arc::clone(&limiter);
        let cancel = cancel.clone();
        tokio::spawn(async move { limiter.wait(&cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let err = waiter.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_already_cancelled_token_fails_fast() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(limiter.wait(&cancel).await.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_scheduled_adjustments_fire_together_at_trigger() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let cancel = CancellationToken::new();
    let at = Instant::now() + Duration::from_millis(80);

    limiter.schedule_rate(at, Rate::per(nz(5), Duration::from_secs(1)));
    limiter.schedule_burst(at, 4);
    assert_eq!(limiter.pending().len(), 2);

    // Trigger not reached yet
    limiter.wait(&cancel).await.unwrap();
    assert_eq!(limiter.rate(), Rate::Unlimited);
    assert_eq!(limiter.pending().len(), 2);

    tokio::time::sleep(Duration::from_millis(120)).await;
    limiter.wait(&cancel).await.unwrap();

    assert_eq!(limiter.rate(), Rate::Every(Duration::from_millis(200)));
    assert_eq!(limiter.burst().get(), 4);
    assert!(limiter.pending().is_empty());
    assert!(limiter.trigger().is_none());
}

#[tokio::test]
async fn test_later_schedule_moves_the_single_trigger() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let cancel = CancellationToken::new();
    let now = Instant::now();

    limiter.schedule_burst(now + Duration::from_secs(3600), 2);
    limiter.schedule_burst(now, 7);
    assert_eq!(limiter.trigger(), Some(now));

    limiter.wait(&cancel).await.unwrap();

    // Both queued adjustments fired, in order
    assert_eq!(limiter.burst().get(), 7);
    assert!(limiter.pending().is_empty());
}

#[tokio::test]
async fn test_zero_burst_is_treated_as_one() {
    let limiter = AdaptiveRateLimiter::unlimited();
    limiter.schedule_burst(Instant::now(), 0);
    assert_eq!(limiter.pending(), vec![Adjustment::Burst(nz(1))]);
}

#[test]
fn test_adapt_schedules_reported_rate_once() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let snapshot = RateLimitSnapshot {
        limit: 60,
        remaining: 10,
        reset_at: SystemTime::now() + Duration::from_secs(30),
        window: None,
    };

    limiter.adapt(&snapshot, Some(Duration::from_secs(60)));
    limiter.adapt(&snapshot, Some(Duration::from_secs(60)));

    assert_eq!(
        limiter.pending(),
        vec![Adjustment::Rate(Rate::Every(Duration::from_secs(1)))]
    );
}

#[test]
fn test_adapt_without_window_is_ignored() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let snapshot = RateLimitSnapshot {
        limit: 60,
        remaining: 10,
        reset_at: SystemTime::now(),
        window: None,
    };

    limiter.adapt(&snapshot, None);
    assert!(limiter.pending().is_empty());
}

#[tokio::test]
async fn test_concurrent_admissions_are_spaced() {
    let interval = Duration::from_millis(200);
    let limiter = Arc::new(AdaptiveRateLimiter::new(Rate::Every(interval), nz(1)));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                limiter.wait(&CancellationToken::new()).await.unwrap();
                Instant::now()
            })
        })
        .collect();

    let mut granted = Vec::new();
    for handle in futures::future::join_all(handles).await {
        granted.push(handle.unwrap());
    }
    granted.sort();

    let span = granted[granted.len() - 1] - granted[0];
    assert!(span >= interval * 4 - Duration::from_millis(50), "span was {span:?}");
    for pair in granted.windows(2) {
        assert!(pair[1] - pair[0] >= interval / 2);
    }
}

#[tokio::test]
async fn test_adjustment_keeps_spacing_for_parked_waiter() {
    let interval = Duration::from_millis(300);
    let limiter = Arc::new(AdaptiveRateLimiter::new(Rate::Every(interval), nz(1)));
    let cancel = CancellationToken::new();

    limiter.wait(&cancel).await.unwrap();
    let first = Instant::now();

    let parked = {
        let limiter = Arc::clone(&limiter);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            limiter.wait(&cancel).await.unwrap();
            Instant::now()
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Same rate, fired immediately: the rebuilt bucket must not admit a burst
    limiter.schedule_rate(Instant::now(), Rate::Every(interval));
    limiter.wait(&cancel).await.unwrap();
    let third = Instant::now();

    let mut granted = vec![first, parked.await.unwrap(), third];
    granted.sort();
    for pair in granted.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= interval - Duration::from_millis(50), "admissions only {gap:?} apart");
    }
    assert!(limiter.pending().is_empty());
}

#[tokio::test]
async fn test_parked_waiter_follows_faster_rate() {
    let limiter = Arc::new(AdaptiveRateLimiter::new(
        Rate::per(nz(1), Duration::from_secs(60)),
        nz(1),
    ));
    let cancel = CancellationToken::new();
    limiter.wait(&cancel).await.unwrap();

    let parked = {
        let limiter = Arc::clone(&limiter);
        let cancel = cancel.clone();
        tokio::spawn(async move { limiter.wait(&cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    limiter.schedule_rate(Instant::now(), Rate::Every(Duration::from_millis(50)));

    let admitted = tokio::time::timeout(Duration::from_secs(2), parked)
        .await
        .expect("parked waiter should move to the faster bucket");
    admitted.unwrap().unwrap();
    assert_eq!(limiter.rate(), Rate::Every(Duration::from_millis(50)));
}

#[tokio::test]
async fn test_parked_waiter_applies_trigger_when_it_passes() {
    let limiter = Arc::new(AdaptiveRateLimiter::new(
        Rate::per(nz(1), Duration::from_secs(60)),
        nz(1),
    ));
    let cancel = CancellationToken::new();
    limiter.wait(&cancel).await.unwrap();

    limiter.schedule_rate(
        Instant::now() + Duration::from_millis(100),
        Rate::Every(Duration::from_millis(20)),
    );

    let admitted = tokio::time::timeout(Duration::from_secs(2), limiter.wait(&cancel)).await;
    assert!(admitted.is_ok(), "waiter should pick up the adjustment at its trigger");
    assert!(limiter.trigger().is_none());
}

#[test]
fn test_adapt_with_far_future_reset_does_not_panic() {
    let limiter = AdaptiveRateLimiter::unlimited();
    let snapshot = RateLimitSnapshot {
        limit: 60,
        remaining: 0,
        reset_at: SystemTime::UNIX_EPOCH + Duration::from_secs(i64::MAX as u64 / 2),
        window: Some(Duration::from_secs(60)),
    };

    limiter.adapt(&snapshot, None);
    assert!(limiter.pending().len() <= 1);
}
