//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and reports every problem
//! at once rather than stopping at the first.

use std::fmt;

use super::schema::HarnessConfig;

/// Longest stream name the service accepts.
const MAX_STREAM_NAME: usize = 128;

/// Room left in the stream name for the generated suffix.
const NAME_SUFFIX_RESERVE: usize = 32;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `stream.shard_count`.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration.
pub fn validate_config(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let url = config.endpoint.url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ValidationError::new(
            "endpoint.url",
            format!("expected an http:// or https:// URL, got {:?}", url),
        ));
    }
    if config.endpoint.target_prefix.is_empty() {
        errors.push(ValidationError::new(
            "endpoint.target_prefix",
            "must not be empty",
        ));
    }
    if config.endpoint.request_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "endpoint.request_timeout_ms",
            "must be greater than zero",
        ));
    }

    let prefix = config.stream.name_prefix.as_str();
    if prefix.is_empty() {
        errors.push(ValidationError::new("stream.name_prefix", "must not be empty"));
    } else if prefix.len() > MAX_STREAM_NAME - NAME_SUFFIX_RESERVE {
        errors.push(ValidationError::new(
            "stream.name_prefix",
            format!(
                "must be at most {} characters",
                MAX_STREAM_NAME - NAME_SUFFIX_RESERVE
            ),
        ));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        errors.push(ValidationError::new(
            "stream.name_prefix",
            "may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    if config.stream.shard_count == 0 {
        errors.push(ValidationError::new(
            "stream.shard_count",
            "must be at least 1",
        ));
    }
    let key_len = config.stream.partition_key.chars().count();
    if !(1..=256).contains(&key_len) {
        errors.push(ValidationError::new(
            "stream.partition_key",
            "must be 1 to 256 characters",
        ));
    }

    let retry = &config.retry;
    if retry.base_delay_ms == 0 {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            "must be greater than zero",
        ));
    }
    if let Some(max) = retry.max_delay_ms {
        if max < retry.base_delay_ms {
            errors.push(ValidationError::new(
                "retry.max_delay_ms",
                "must not be below retry.base_delay_ms",
            ));
        }
    }
    if !(0.0..=1.0).contains(&retry.jitter) {
        errors.push(ValidationError::new(
            "retry.jitter",
            "must be between 0.0 and 1.0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
