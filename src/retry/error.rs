//! What the engine hands back when a probe never came good.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// The budget ran out before the probe succeeded.
///
/// Carries the last failure exactly as the probe produced it; earlier
/// failures are dropped.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::{retry_blocking, ProbeFailure, RetryPolicy};
///
/// let result: Result<(), _> = retry_blocking(
///     &RetryPolicy::immediate().with_max_retries(2),
///     || Err(ProbeFailure::new("stream is not active")),
/// );
///
/// let exhausted = result.unwrap_err();
/// assert_eq!(exhausted.attempts, 3);
/// assert_eq!(exhausted.final_error.reason(), "stream is not active");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Failure of the last attempt.
    pub final_error: E,
    /// Probe executions, first attempt included.
    pub attempts: u32,
    /// Wall-clock time from the first attempt to giving up.
    pub elapsed: Duration,
}

impl<E> RetryExhausted<E> {
    /// Record giving up after `attempts` executions.
    pub fn new(final_error: E, attempts: u32, elapsed: Duration) -> Self {
        Self {
            final_error,
            attempts,
            elapsed,
        }
    }

    /// Drop the bookkeeping and keep the last failure.
    pub fn into_final_error(self) -> E {
        self.final_error
    }

    /// Apply `f` to the last failure, keeping the bookkeeping.
    pub fn map_err<F, G>(self, f: G) -> RetryExhausted<F>
    where
        G: FnOnce(E) -> F,
    {
        RetryExhausted {
            final_error: f(self.final_error),
            attempts: self.attempts,
            elapsed: self.elapsed,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts in {:.1?}: {}",
            self.attempts, self.elapsed, self.final_error
        )
    }
}

impl<E: Error + 'static> Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.final_error)
    }
}

/// Outcome of [`with_timeout`](super::with_timeout) when it is not a
/// success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The attempt was still running at the deadline and was dropped.
    Timeout {
        /// The deadline.
        duration: Duration,
    },
    /// The attempt finished in time but failed.
    Inner(E),
}

impl<E> TimeoutError<E> {
    /// Whether the deadline was hit.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The attempt's own failure, if it got as far as producing one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "no answer within {:?}", duration),
            Self::Inner(e) => e.fmt(f),
        }
    }
}

impl<E: Error + 'static> Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::ProbeFailure;

    #[test]
    fn test_exhausted_display_names_the_last_reason() {
        let err = RetryExhausted::new("stream is not active", 7, Duration::from_millis(500));
        assert_eq!(
            err.to_string(),
            "gave up after 7 attempts in 500.0ms: stream is not active"
        );
    }

    #[test]
    fn test_exhausted_source_is_final_error() {
        let err = RetryExhausted::new(ProbeFailure::new("boom"), 1, Duration::ZERO);
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
        assert_eq!(err.into_final_error().reason(), "boom");
    }

    #[test]
    fn test_map_err_keeps_bookkeeping() {
        let err = RetryExhausted::new(ProbeFailure::new("late"), 4, Duration::from_secs(3))
            .map_err(ProbeFailure::into_reason);
        assert_eq!(err.final_error, "late");
        assert_eq!(err.attempts, 4);
        assert_eq!(err.elapsed, Duration::from_secs(3));
    }

    #[test]
    fn test_timeout_variants() {
        let timeout: TimeoutError<ProbeFailure> = TimeoutError::Timeout {
            duration: Duration::from_secs(5),
        };
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "no answer within 5s");
        assert!(timeout.into_inner().is_none());

        let inner = TimeoutError::Inner(ProbeFailure::new("throttled"));
        assert!(!inner.is_timeout());
        assert_eq!(inner.to_string(), "throttled");
        assert_eq!(inner.into_inner().map(ProbeFailure::into_reason).as_deref(), Some("throttled"));
    }
}
