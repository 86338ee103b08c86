//! Testing utilities for code built on the retry engine.
//!
//! [`ScriptedProbe`] stands in for a service that needs a few attempts to
//! catch up, and the assertion macros check [`Outcome`](crate::Outcome)s
//! with readable panic messages.
//!
//! # Examples
//!
//! ```rust
//! use kinesis_probe::testing::ScriptedProbe;
//! use kinesis_probe::{assert_probe_failure, assert_probe_ok, retry_blocking, RetryPolicy};
//!
//! let probe = ScriptedProbe::new(2, "ready");
//! assert_probe_failure!(probe.call(), "scripted failure 1");
//!
//! let result = retry_blocking(&RetryPolicy::immediate().with_max_retries(3), || probe.call());
//! assert_eq!(result.unwrap(), "ready");
//! assert_eq!(probe.calls(), 3);
//! assert_probe_ok!(probe.call());
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::retry::{Outcome, ProbeFailure};

/// A probe that fails a fixed number of times, then keeps succeeding.
///
/// Clones share the call counter, so a clone can be moved into a retry loop
/// while the original is inspected afterwards.
#[derive(Debug, Clone)]
pub struct ScriptedProbe<T> {
    failures: u32,
    value: T,
    calls: Arc<AtomicU32>,
}

impl<T: Clone> ScriptedProbe<T> {
    /// Fail `failures` times, then return `value`.
    pub fn new(failures: u32, value: T) -> Self {
        Self {
            failures,
            value,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Never succeed.
    pub fn always_failing(value: T) -> Self {
        Self::new(u32::MAX, value)
    }

    /// Run one attempt. The n-th failure reads `scripted failure n`.
    pub fn call(&self) -> Outcome<T> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(ProbeFailure::new(format!("scripted failure {}", n + 1)))
        } else {
            Ok(self.value.clone())
        }
    }

    /// [`call`](Self::call) as a future, for the async engine.
    pub async fn call_async(&self) -> Outcome<T> {
        self.call()
    }

    /// Attempts made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Assert that an outcome succeeded.
///
/// ```rust
/// use kinesis_probe::{assert_probe_ok, Outcome};
///
/// let outcome: Outcome<u8> = Ok(1);
/// assert_probe_ok!(outcome);
/// ```
#[macro_export]
macro_rules! assert_probe_ok {
    ($outcome:expr) => {
        match $outcome {
            Ok(_) => {}
            Err(failure) => {
                panic!("Expected Ok, got failure: {}", failure);
            }
        }
    };
}

/// Assert that an outcome failed, optionally with a given reason.
///
/// ```rust
/// use kinesis_probe::{assert_probe_failure, Outcome, ProbeFailure};
///
/// let outcome: Outcome<u8> = Err(ProbeFailure::new("not yet"));
/// assert_probe_failure!(outcome.clone());
/// assert_probe_failure!(outcome, "not yet");
/// ```
#[macro_export]
macro_rules! assert_probe_failure {
    ($outcome:expr) => {
        match $outcome {
            Err(_) => {}
            Ok(v) => {
                panic!("Expected failure, got Ok: {:?}", v);
            }
        }
    };
    ($outcome:expr, $reason:expr) => {
        match $outcome {
            Err(failure) => {
                assert_eq!(failure.reason(), $reason);
            }
            Ok(v) => {
                panic!("Expected failure {:?}, got Ok: {:?}", $reason, v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for ProbeFailure {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        "[a-z ]{1,32}".prop_map(ProbeFailure::new).boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for crate::retry::RetryBudget {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0u32..=16).prop_map(crate::retry::RetryBudget::attempts).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{retry, RetryPolicy};

    #[test]
    fn scripted_probe_fails_then_succeeds() {
        let probe = ScriptedProbe::new(2, 7);
        assert_eq!(probe.call().unwrap_err().reason(), "scripted failure 1");
        assert_eq!(probe.call().unwrap_err().reason(), "scripted failure 2");
        assert_eq!(probe.call(), Ok(7));
        assert_eq!(probe.call(), Ok(7));
        assert_eq!(probe.calls(), 4);
    }

    #[test]
    fn clones_share_the_counter() {
        let probe = ScriptedProbe::new(0, ());
        let clone = probe.clone();
        let _ = clone.call();
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn scripted_probe_under_async_retry() {
        let probe = ScriptedProbe::always_failing(());
        let result = retry(&RetryPolicy::immediate().with_max_retries(2), || {
            probe.call_async()
        })
        .await;

        assert_eq!(result.unwrap_err().attempts, 3);
        assert_eq!(probe.calls(), 3);
    }

    #[test]
    fn assert_probe_ok_macro() {
        let outcome: Outcome<u8> = Ok(1);
        assert_probe_ok!(outcome);
    }

    #[test]
    fn assert_probe_failure_macro() {
        let outcome: Outcome<u8> = Err(ProbeFailure::new("late"));
        assert_probe_failure!(outcome.clone());
        assert_probe_failure!(outcome, "late");
    }

    #[test]
    #[should_panic(expected = "Expected Ok, got failure: late")]
    fn assert_probe_ok_panics_on_failure() {
        let outcome: Outcome<u8> = Err(ProbeFailure::new("late"));
        assert_probe_ok!(outcome);
    }

    #[test]
    #[should_panic(expected = "Expected failure, got Ok")]
    fn assert_probe_failure_panics_on_success() {
        let outcome: Outcome<u8> = Ok(1);
        assert_probe_failure!(outcome);
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;
        use crate::retry::RetryBudget;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_budgets_stay_small(budget in any::<RetryBudget>()) {
                prop_assert!(budget.retries() <= 16);
            }

            #[test]
            fn arbitrary_failures_have_a_reason(failure in any::<ProbeFailure>()) {
                prop_assert!(!failure.reason().is_empty());
            }
        }
    }
}
