//! Retry budgets and the wait-time derivation.

use std::time::Duration;

/// Maximum number of additional attempts after the first.
///
/// A budget of 0 means the probe runs exactly once.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::RetryBudget;
/// use std::time::Duration;
///
/// assert_eq!(RetryBudget::attempts(5).retries(), 5);
/// assert_eq!(RetryBudget::attempts(5).max_executions(), 6);
///
/// // 64 seconds of nominal waiting buys six retries.
/// assert_eq!(RetryBudget::from_wait(Duration::from_secs(64)).retries(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RetryBudget(u32);

impl RetryBudget {
    /// A budget of zero retries.
    pub const NONE: RetryBudget = RetryBudget(0);

    /// Budget bounded directly by a retry count.
    pub const fn attempts(retries: u32) -> Self {
        Self(retries)
    }

    /// Budget derived from a time allowance, see [`derive_budget`].
    ///
    /// Sub-second remainders are ignored.
    pub fn from_wait(wait: Duration) -> Self {
        Self(derive_budget(wait.as_secs()))
    }

    /// Number of retries allowed after the first attempt.
    pub const fn retries(&self) -> u32 {
        self.0
    }

    /// Total number of probe executions, first attempt included.
    pub const fn max_executions(&self) -> u32 {
        self.0.saturating_add(1)
    }
}

impl From<u32> for RetryBudget {
    fn from(retries: u32) -> Self {
        Self(retries)
    }
}

/// Number of retries that fit a wait of `seconds`: `floor(log2(seconds))`.
///
/// With exponential backoff starting at one second the delays
/// `1, 2, 4, .., 2^(n-1)` sum to `2^n - 1`, which stays within `seconds`.
/// Short waits get very few retries: one second allows none at all.
/// Zero is treated like one.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::retry::derive_budget;
///
/// assert_eq!(derive_budget(64), 6);
/// assert_eq!(derive_budget(63), 5);
/// assert_eq!(derive_budget(2), 1);
/// assert_eq!(derive_budget(1), 0);
/// assert_eq!(derive_budget(0), 0);
/// ```
pub fn derive_budget(seconds: u64) -> u32 {
    seconds.checked_ilog2().unwrap_or(0)
}

#[cfg(test)]
mod budget_tests {
    use super::*;

    #[test]
    fn test_derive_budget_powers_of_two() {
        for exp in 0..64u32 {
            assert_eq!(derive_budget(1u64 << exp), exp);
        }
    }

    #[test]
    fn test_derive_budget_rounds_down() {
        assert_eq!(derive_budget(3), 1);
        assert_eq!(derive_budget(127), 6);
        assert_eq!(derive_budget(u64::MAX), 63);
    }

    #[test]
    fn test_from_wait_ignores_subsecond_part() {
        let budget = RetryBudget::from_wait(Duration::from_millis(1999));
        assert_eq!(budget.retries(), 0);
    }

    #[test]
    fn test_max_executions_saturates() {
        assert_eq!(RetryBudget::attempts(u32::MAX).max_executions(), u32::MAX);
        assert_eq!(RetryBudget::NONE.max_executions(), 1);
    }
}
