//! Probe outcomes.

use std::fmt;

/// Result of a single probe execution.
///
/// Failures carry a human-readable reason only; the retry engine treats
/// every failure the same way.
pub type Outcome<T> = Result<T, ProbeFailure>;

/// Why a probe did not succeed.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::{Outcome, ProbeFailure};
///
/// fn probe(ready: bool) -> Outcome<&'static str> {
///     if ready {
///         Ok("ready")
///     } else {
///         Err(ProbeFailure::new("not ready yet"))
///     }
/// }
///
/// assert_eq!(probe(false).unwrap_err().reason(), "not ready yet");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeFailure {
    reason: String,
}

impl ProbeFailure {
    /// Create a failure with the given diagnostic.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Build a failure from any displayable error.
    pub fn from_error<E: fmt::Display>(error: E) -> Self {
        Self::new(error.to_string())
    }

    /// The diagnostic message.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Consume the failure and return its diagnostic.
    pub fn into_reason(self) -> String {
        self.reason
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ProbeFailure {}

impl From<String> for ProbeFailure {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

impl From<&str> for ProbeFailure {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}
