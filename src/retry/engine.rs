//! The retry loop.
//!
//! Every loop in this module drives the same [`RetryState`] machine:
//!
//! ```text
//! Pending(n) --probe succeeds-------------> Done(success)
//! Pending(n) --probe fails, n > 0---------> Pending(n - 1)   (after a delay)
//! Pending(0) --probe fails----------------> Done(failure)
//! ```
//!
//! The state is pure bookkeeping; the async and blocking loops only differ in
//! how they wait.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use super::error::{RetryExhausted, TimeoutError};
use super::policy::{RetryEvent, RetryPolicy};

/// Bookkeeping for one retry call.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::retry::RetryState;
/// use kinesis_probe::RetryPolicy;
///
/// let policy = RetryPolicy::immediate().with_max_retries(1);
/// let mut state = RetryState::new(&policy);
///
/// assert_eq!(state.attempts_left(), 1);
/// assert!(state.on_failure().is_some()); // Pending(1) -> Pending(0)
/// assert_eq!(state.attempts_left(), 0);
/// assert!(state.on_failure().is_none()); // Pending(0) -> Done(failure)
/// assert_eq!(state.attempts(), 2);
/// ```
#[derive(Debug)]
pub struct RetryState<'p> {
    policy: &'p RetryPolicy,
    retries_used: u32,
    started: Instant,
}

impl<'p> RetryState<'p> {
    /// Start in `Pending(budget)`.
    pub fn new(policy: &'p RetryPolicy) -> Self {
        Self {
            policy,
            retries_used: 0,
            started: Instant::now(),
        }
    }

    /// Retries still available.
    pub fn attempts_left(&self) -> u32 {
        self.policy
            .budget()
            .retries()
            .saturating_sub(self.retries_used)
    }

    /// Probe executions so far, counting the one in flight.
    pub fn attempts(&self) -> u32 {
        self.retries_used.saturating_add(1)
    }

    /// Time since the state was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record a failed attempt.
    ///
    /// Returns the delay before the next attempt, or `None` when the budget
    /// is spent and the failure is final.
    pub fn on_failure(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_with_jitter(self.retries_used)?;
        self.retries_used += 1;
        Some(delay)
    }

    /// Wrap the final failure.
    pub fn exhausted<E>(&self, error: E) -> RetryExhausted<E> {
        RetryExhausted::new(error, self.attempts(), self.elapsed())
    }
}

/// Run `probe` until it succeeds or the policy's budget is spent.
///
/// The probe runs at most `budget + 1` times. The first success is returned
/// as soon as it happens; after the last failed attempt the error from that
/// attempt is returned unchanged inside [`RetryExhausted`].
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::{retry, ProbeFailure, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let mut polls = 0;
/// let status = retry(&RetryPolicy::immediate().with_max_retries(6), || {
///     polls += 1;
///     let ready = polls >= 3;
///     async move {
///         if ready {
///             Ok("ACTIVE")
///         } else {
///             Err(ProbeFailure::new("stream is not active"))
///         }
///     }
/// })
/// .await;
///
/// assert_eq!(status, Ok("ACTIVE"));
/// assert_eq!(polls, 3);
/// # });
/// ```
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, probe: F) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_with_hooks(policy, probe, |_: &RetryEvent<'_, E>| {}).await
}

/// Like [`retry`], calling `on_retry` after every failed attempt.
///
/// The hook also sees the final failure, with `next_delay == None`.
pub async fn retry_with_hooks<T, E, F, Fut, H>(
    policy: &RetryPolicy,
    mut probe: F,
    mut on_retry: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    H: FnMut(&RetryEvent<'_, E>),
{
    let mut state = RetryState::new(policy);

    loop {
        match probe().await {
            Ok(value) => {
                log_success(&state);
                return Ok(value);
            }
            Err(error) => {
                let attempt = state.attempts();
                let next_delay = state.on_failure();
                notify(&mut on_retry, attempt, &error, next_delay, state.elapsed());

                match next_delay {
                    Some(delay) => {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    None => return Err(state.exhausted(error)),
                }
            }
        }
    }
}

/// Blocking variant of [`retry`] for synchronous probes.
///
/// Sleeps the calling thread between attempts.
pub fn retry_blocking<T, E, F>(policy: &RetryPolicy, mut probe: F) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Result<T, E>,
    E: fmt::Display,
{
    let mut state = RetryState::new(policy);

    loop {
        match probe() {
            Ok(value) => {
                log_success(&state);
                return Ok(value);
            }
            Err(error) => {
                let attempt = state.attempts();
                let next_delay = state.on_failure();
                notify(
                    &mut |_: &RetryEvent<'_, E>| {},
                    attempt,
                    &error,
                    next_delay,
                    state.elapsed(),
                );

                match next_delay {
                    Some(delay) => {
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                    }
                    None => return Err(state.exhausted(error)),
                }
            }
        }
    }
}

/// Bound a single attempt by `duration`.
///
/// A probe that can hang should be wrapped in this before being handed to
/// [`retry`]; the loop itself never interrupts an attempt.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::retry::{with_timeout, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = with_timeout(Duration::from_millis(10), async {
///     tokio::time::sleep(Duration::from_secs(10)).await;
///     Ok::<_, String>(42)
/// })
/// .await;
///
/// assert_eq!(
///     result,
///     Err(TimeoutError::Timeout { duration: Duration::from_millis(10) })
/// );
/// # });
/// ```
pub async fn with_timeout<T, E, Fut>(duration: Duration, future: Fut) -> Result<T, TimeoutError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TimeoutError::Inner(e)),
        Err(_) => Err(TimeoutError::Timeout { duration }),
    }
}

fn notify<E, H>(
    on_retry: &mut H,
    attempt: u32,
    error: &E,
    next_delay: Option<Duration>,
    elapsed: Duration,
) where
    E: fmt::Display,
    H: FnMut(&RetryEvent<'_, E>),
{
    match next_delay {
        Some(delay) => tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason = %error,
            "probe failed, retrying"
        ),
        None => tracing::warn!(
            attempts = attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            reason = %error,
            "retry budget exhausted"
        ),
    }

    on_retry(&RetryEvent {
        attempt,
        error,
        next_delay,
        elapsed,
    });
}

fn log_success(state: &RetryState<'_>) {
    if state.attempts() > 1 {
        tracing::debug!(attempts = state.attempts(), "probe succeeded after retries");
    }
}
