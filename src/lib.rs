//! # kinesis-probe
//!
//! Bounded retry for checks against an eventually consistent stream
//! service, and a typed client to run them with.
//!
//! A freshly created stream is `CREATING` for a while; a freshly written
//! record may not be readable on the first try. Tests that talk to such a
//! service need to ask again, a bounded number of times, and report the last
//! reason when they give up. That is what this crate does:
//!
//! - [`retry`](mod@retry): the engine. A [`RetryPolicy`] says how often and how long
//!   to wait; [`retry()`] and [`retry_blocking()`] run a probe under it.
//! - [`client`]: the [`StreamClient`](client::StreamClient) trait with an HTTP
//!   implementation and an in-memory one that simulates consistency lag.
//! - [`probe`] and [`scenario`]: ready-made checks for stream activation,
//!   record visibility and deletion.
//!
//! ## Quick Example
//!
//! ```rust
//! use kinesis_probe::{retry_blocking, Outcome, ProbeFailure, RetryPolicy};
//!
//! let mut polls = 0;
//! let mut status = || -> Outcome<&'static str> {
//!     polls += 1;
//!     if polls < 3 {
//!         Err(ProbeFailure::new("stream is not active"))
//!     } else {
//!         Ok("ACTIVE")
//!     }
//! };
//!
//! let result = retry_blocking(&RetryPolicy::immediate().with_max_retries(5), &mut status);
//! assert_eq!(result.unwrap(), "ACTIVE");
//! ```
//!
//! Budgets can also be derived from a nominal wait:
//!
//! ```rust
//! use kinesis_probe::retry::derive_budget;
//! use kinesis_probe::RetryBudget;
//! use std::time::Duration;
//!
//! assert_eq!(derive_budget(64), 6);
//! assert_eq!(RetryBudget::from_wait(Duration::from_secs(64)).retries(), 6);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod observability;
pub mod probe;
pub mod retry;
pub mod scenario;
pub mod testing;

// Re-exports
pub use retry::{
    retry, retry_blocking, retry_with_hooks, with_timeout, Outcome, ProbeFailure, RetryBudget,
    RetryExhausted, RetryPolicy, TimeoutError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{HttpStreamClient, MemoryStreamClient, StreamClient};
    pub use crate::retry::{
        retry, retry_blocking, Outcome, ProbeFailure, RetryBudget, RetryExhausted, RetryPolicy,
    };
    pub use crate::scenario::{run_lifecycle, ScenarioError, ScenarioSettings};
}
