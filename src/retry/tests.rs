//! Tests for the retry loops.

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn fails_then_succeeds(
    attempts: &Arc<AtomicU32>,
    failures: u32,
) -> impl FnMut() -> std::future::Ready<Outcome<&'static str>> {
    let attempts = attempts.clone();
    move || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        std::future::ready(if n < failures {
            Err(ProbeFailure::new(format!("transient failure {}", n + 1)))
        } else {
            Ok("success")
        })
    }
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(
        &RetryPolicy::immediate().with_max_retries(5),
        fails_then_succeeds(&attempts, 2),
    )
    .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhausted_returns_final_error() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(
        &RetryPolicy::immediate().with_max_retries(3),
        fails_then_succeeds(&attempts, u32::MAX),
    )
    .await;

    let exhausted = result.unwrap_err();
    assert_eq!(exhausted.attempts, 4); // 1 initial + 3 retries
    assert_eq!(exhausted.final_error.reason(), "transient failure 4");
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_zero_budget_runs_once() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(
        &RetryPolicy::within(Duration::from_secs(1)),
        fails_then_succeeds(&attempts, 1),
    )
    .await;

    assert_eq!(result.unwrap_err().attempts, 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_success_on_last_allowed_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(
        &RetryPolicy::immediate().with_max_retries(2),
        fails_then_succeeds(&attempts, 2),
    )
    .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_with_hooks_sees_every_failure() {
    let attempts = Arc::new(AtomicU32::new(0));
    let mut events = Vec::new();

    let result = retry_with_hooks(
        &RetryPolicy::immediate().with_max_retries(1),
        fails_then_succeeds(&attempts, u32::MAX),
        |event: &RetryEvent<'_, ProbeFailure>| {
            events.push((event.attempt, event.error.reason().to_string(), event.next_delay));
        },
    )
    .await;

    assert!(result.is_err());
    assert_eq!(
        events,
        vec![
            (1, "transient failure 1".to_string(), Some(Duration::ZERO)),
            (2, "transient failure 2".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn test_retry_with_hooks_not_called_on_first_success() {
    let mut hook_calls = 0;

    let result = retry_with_hooks(
        &RetryPolicy::immediate().with_max_retries(3),
        || async { Ok::<_, ProbeFailure>(7) },
        |_: &RetryEvent<'_, ProbeFailure>| hook_calls += 1,
    )
    .await;

    assert_eq!(result, Ok(7));
    assert_eq!(hook_calls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_timing() {
    let attempts = Arc::new(AtomicU32::new(0));
    let start = tokio::time::Instant::now();

    let result = retry(
        &RetryPolicy::exponential(Duration::from_millis(10)).with_max_retries(5),
        fails_then_succeeds(&attempts, 3),
    )
    .await;

    assert_eq!(result, Ok("success"));
    // 10ms + 20ms + 40ms
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(70) && elapsed < Duration::from_millis(80),
        "Expected about 70ms, got {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_time_budget_stays_within_wait() {
    let start = tokio::time::Instant::now();

    let result = retry(&RetryPolicy::within(Duration::from_secs(64)), || async {
        Err::<(), _>(ProbeFailure::new("stream is not active"))
    })
    .await;

    let exhausted = result.unwrap_err();
    assert_eq!(exhausted.attempts, 7);
    assert!(start.elapsed() <= Duration::from_secs(64));
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_timeout_per_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(&RetryPolicy::immediate().with_max_retries(5), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        with_timeout(Duration::from_millis(10), async move {
            if n < 2 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok::<_, ProbeFailure>("success")
        })
    })
    .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_timeout_passes_through_inner_error() {
    let result = with_timeout(Duration::from_secs(1), async {
        Err::<i32, _>(ProbeFailure::new("no records visible yet"))
    })
    .await;

    let err = result.unwrap_err();
    assert!(!err.is_timeout());
    assert_eq!(err.into_inner().unwrap().reason(), "no records visible yet");
}

#[test]
fn test_retry_blocking_counts_executions() {
    for budget in 0..5u32 {
        let mut runs = 0;
        let result: Result<(), _> =
            retry_blocking(&RetryPolicy::immediate().with_max_retries(budget), || {
                runs += 1;
                Err(ProbeFailure::new("down"))
            });

        assert_eq!(runs, budget + 1);
        assert_eq!(result.unwrap_err().attempts, budget + 1);
    }
}

#[test]
fn test_retry_blocking_sleeps_between_attempts() {
    let start = std::time::Instant::now();
    let mut runs = 0;

    let result = retry_blocking(
        &RetryPolicy::constant(Duration::from_millis(5)).with_max_retries(2),
        || {
            runs += 1;
            if runs < 3 {
                Err(ProbeFailure::new("not yet"))
            } else {
                Ok(runs)
            }
        },
    );

    assert_eq!(result, Ok(3));
    assert!(start.elapsed() >= Duration::from_millis(10));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_exhaustion_is_logged() {
    let _ = retry(&RetryPolicy::immediate().with_max_retries(1), || async {
        Err::<(), _>(ProbeFailure::new("stream is not active"))
    })
    .await;

    assert!(logs_contain("probe failed, retrying"));
    assert!(logs_contain("retry budget exhausted"));
    assert!(logs_contain("stream is not active"));
}
