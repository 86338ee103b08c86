//! How many times to retry, and how long to wait in between.

use std::time::Duration;

use super::budget::RetryBudget;

/// First delay used by time-budgeted policies.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// A retry policy describing how often and how patiently to re-run a probe.
///
/// Policies are plain data: they compute delays but never sleep. The
/// budget always bounds the loop; a fresh policy allows no retries until
/// one is set.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::{RetryBudget, RetryPolicy};
/// use std::time::Duration;
///
/// // Attempt-bounded: five retries, doubling from 200ms.
/// let policy = RetryPolicy::exponential(Duration::from_millis(200))
///     .with_max_retries(5);
/// assert_eq!(policy.budget(), RetryBudget::attempts(5));
///
/// // Time-bounded: floor(log2(64)) = 6 retries, 1s, 2s, .. 32s apart.
/// let policy = RetryPolicy::within(Duration::from_secs(64));
/// assert_eq!(policy.budget().retries(), 6);
/// assert_eq!(policy.delay_for_attempt(5), Some(Duration::from_secs(32)));
/// assert_eq!(policy.delay_for_attempt(6), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    backoff: Backoff,
    budget: RetryBudget,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Retry straight away.
    Immediate,
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// Delays are used as computed.
    #[default]
    None,
    /// Uniform in `delay * (1 - f) ..= delay * (1 + f)`.
    Proportional(f64),
    /// Uniform in `0 ..= delay`.
    Full,
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The failure from that attempt.
    pub error: &'a E,
    /// Delay before the next attempt, `None` when the budget is spent.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

impl RetryPolicy {
    /// Policy that re-runs the probe without waiting.
    pub fn immediate() -> Self {
        Self::with_backoff(Backoff::Immediate)
    }

    /// Policy with a constant delay between retries.
    ///
    /// ```rust
    /// use kinesis_probe::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::constant(Duration::from_millis(500))
    ///     .with_max_retries(2);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(2), None);
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self::with_backoff(Backoff::Constant(delay))
    }

    /// Policy with exponentially increasing delay: `base * 2^attempt`.
    pub fn exponential(base: Duration) -> Self {
        Self::with_backoff(Backoff::Exponential { base })
    }

    /// Time-budgeted policy for a nominal wait.
    ///
    /// Retries `floor(log2(wait_secs))` times with exponential backoff from
    /// [`DEFAULT_BASE_DELAY`], each delay capped at `wait`.
    pub fn within(wait: Duration) -> Self {
        Self::exponential(DEFAULT_BASE_DELAY)
            .with_budget(RetryBudget::from_wait(wait))
            .with_max_delay(wait)
    }

    /// Attempt-bounded policy with exponential backoff from
    /// [`DEFAULT_BASE_DELAY`].
    pub fn attempts(retries: u32) -> Self {
        Self::exponential(DEFAULT_BASE_DELAY).with_max_retries(retries)
    }

    fn with_backoff(backoff: Backoff) -> Self {
        Self {
            backoff,
            budget: RetryBudget::NONE,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Replace the retry budget.
    pub fn with_budget(mut self, budget: RetryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the number of retries after the first attempt.
    ///
    /// `with_max_retries(3)` means up to 4 executions in total.
    pub fn with_max_retries(self, n: u32) -> Self {
        self.with_budget(RetryBudget::attempts(n))
    }

    /// Cap every delay at `d`.
    ///
    /// ```rust
    /// use kinesis_probe::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100))
    ///     .with_max_retries(10)
    ///     .with_max_delay(Duration::from_millis(300));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(300)));
    /// ```
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add ±`factor` proportional jitter (clamped to `0.0..=1.0`, NaN is 0).
    ///
    /// **Note**: Requires the `jitter` feature. Without it delays are left
    /// untouched.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Use full jitter: a random delay between 0 and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// The retry budget.
    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// The backoff schedule.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// The delay cap, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// The jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Delay before retry `attempt` (0-indexed), or `None` once the budget
    /// is spent.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.budget.retries() {
            return None;
        }

        let delay = match &self.backoff {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Constant(d) => *d,
            Backoff::Exponential { base } => base.saturating_mul(2u32.saturating_pow(attempt)),
        };

        Some(cap(delay, self.max_delay))
    }

    /// Delay before retry `attempt` with jitter applied.
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let delay = self.delay_for_attempt(attempt)?;
        Some(cap(self.jitter.apply(delay), self.max_delay))
    }
}

impl JitterStrategy {
    /// Randomise `delay`. Without the `jitter` feature this is the identity.
    pub fn apply(&self, delay: Duration) -> Duration {
        let (low, high) = match *self {
            JitterStrategy::None => return delay,
            JitterStrategy::Proportional(factor) => {
                let spread = delay.mul_f64(factor);
                (delay.saturating_sub(spread), delay.saturating_add(spread))
            }
            JitterStrategy::Full => (Duration::ZERO, delay),
        };
        sample(low, high).unwrap_or(delay)
    }
}

#[cfg(feature = "jitter")]
fn sample(low: Duration, high: Duration) -> Option<Duration> {
    use rand::Rng;
    (low < high).then(|| rand::rng().random_range(low..=high))
}

#[cfg(not(feature = "jitter"))]
fn sample(_low: Duration, _high: Duration) -> Option<Duration> {
    None
}

fn cap(delay: Duration, max_delay: Option<Duration>) -> Duration {
    match max_delay {
        Some(max) => delay.min(max),
        None => delay,
    }
}
