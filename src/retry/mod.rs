//! Bounded retry for probes that wait on eventual consistency.
//!
//! A probe is any repeatable check returning an [`Outcome`]. The engine runs
//! it, and on failure runs it again after a delay, until it succeeds or the
//! [`RetryBudget`] is spent:
//!
//! - **Policies are data**: [`RetryPolicy`] computes delays but never sleeps.
//! - **One failure kind**: every failure is treated as transient. A probe that
//!   wants to stop early must return outside the `Outcome` channel.
//! - **Last failure wins**: on exhaustion only the final failure is reported,
//!   unchanged.
//!
//! # Quick Start
//!
//! ```rust
//! use kinesis_probe::{retry, ProbeFailure, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::exponential(Duration::from_millis(1))
//!     .with_max_retries(3);
//!
//! let result = retry(&policy, || async { Ok::<_, ProbeFailure>(42) }).await;
//! assert_eq!(result, Ok(42));
//! # });
//! ```
//!
//! # Bounding modes
//!
//! - **Attempt count**: `RetryPolicy::attempts(5)` or `.with_max_retries(5)`.
//! - **Time budget**: `RetryPolicy::within(Duration::from_secs(64))` derives
//!   `floor(log2(64)) = 6` retries with 1s, 2s, .. 32s backoff.
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to randomise delays:
//!
//! ```toml
//! kinesis-probe = { version = "...", features = ["jitter"] }
//! ```

mod budget;
mod engine;
mod error;
mod outcome;
mod policy;

pub use budget::{derive_budget, RetryBudget};
pub use engine::{retry, retry_blocking, retry_with_hooks, with_timeout, RetryState};
pub use error::{RetryExhausted, TimeoutError};
pub use outcome::{Outcome, ProbeFailure};
pub use policy::{Backoff, JitterStrategy, RetryEvent, RetryPolicy, DEFAULT_BASE_DELAY};

#[cfg(test)]
mod tests;
