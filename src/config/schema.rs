//! Configuration schema.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::client::{Blob, ClientError, HttpStreamClient, DEFAULT_TARGET_PREFIX};
use crate::retry::{RetryBudget, RetryPolicy};
use crate::scenario::ScenarioSettings;

/// Root configuration of the harness.
///
/// ```toml
/// [endpoint]
/// url = "http://localhost:4567"
/// request_timeout_ms = 5000
///
/// [stream]
/// name_prefix = "probe"
/// shard_count = 2
///
/// [retry]
/// active_wait_secs = 64
/// visibility_retries = 5
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Where the service lives.
    pub endpoint: EndpointConfig,
    /// The stream the lifecycle scenario creates.
    pub stream: StreamConfig,
    /// How long to wait on the service.
    pub retry: RetryConfig,
}

/// Service endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL, e.g. `http://localhost:4567`.
    pub url: String,
    /// `X-Amz-Target` prefix.
    pub target_prefix: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4567".to_string(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Lifecycle stream settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Prefix of the generated stream name.
    pub name_prefix: String,
    /// Shards to provision.
    pub shard_count: u32,
    /// Partition key of the test record.
    pub partition_key: String,
    /// Payload of the test record, as UTF-8 text.
    pub payload: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name_prefix: "kinesis-probe".to_string(),
            shard_count: 1,
            partition_key: "key".to_string(),
            payload: "dat".to_string(),
        }
    }
}

/// Wait settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Nominal wait for a stream to become ACTIVE; the retry count is
    /// `floor(log2(secs))`.
    pub active_wait_secs: u64,
    /// Nominal wait for a deleted stream to disappear.
    pub deletion_wait_secs: u64,
    /// Retries while waiting for a written record to become readable.
    pub visibility_retries: u32,
    /// First backoff delay in milliseconds; each retry doubles it.
    pub base_delay_ms: u64,
    /// Upper bound on a single delay in milliseconds.
    pub max_delay_ms: Option<u64>,
    /// Proportional jitter factor in `0.0..=1.0`; needs the `jitter` feature.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            active_wait_secs: 64,
            deletion_wait_secs: 64,
            visibility_retries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: None,
            jitter: 0.0,
        }
    }
}

impl RetryConfig {
    fn backoff(&self) -> RetryPolicy {
        let policy = RetryPolicy::exponential(Duration::from_millis(self.base_delay_ms));
        if self.jitter > 0.0 {
            policy.with_jitter(self.jitter)
        } else {
            policy
        }
    }

    fn timed(&self, wait_secs: u64) -> RetryPolicy {
        let wait = Duration::from_secs(wait_secs);
        let cap = self.max_delay_ms.map_or(wait, Duration::from_millis).min(wait);
        self.backoff()
            .with_budget(RetryBudget::from_wait(wait))
            .with_max_delay(cap)
    }

    /// Policy for awaiting ACTIVE.
    pub fn activation_policy(&self) -> RetryPolicy {
        self.timed(self.active_wait_secs)
    }

    /// Policy for awaiting deletion.
    pub fn deletion_policy(&self) -> RetryPolicy {
        self.timed(self.deletion_wait_secs)
    }

    /// Policy for awaiting a written record.
    pub fn visibility_policy(&self) -> RetryPolicy {
        let policy = self.backoff().with_max_retries(self.visibility_retries);
        match self.max_delay_ms {
            Some(ms) => policy.with_max_delay(Duration::from_millis(ms)),
            None => policy,
        }
    }
}

impl HarnessConfig {
    /// Build an HTTP client for the configured endpoint.
    pub fn http_client(&self) -> Result<HttpStreamClient, ClientError> {
        HttpStreamClient::builder(&self.endpoint.url)
            .target_prefix(&self.endpoint.target_prefix)
            .timeout(Duration::from_millis(self.endpoint.request_timeout_ms))
            .build()
    }

    /// A stream name unlikely to collide with another run.
    pub fn unique_stream_name(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!(
            "{}-{}-{}",
            self.stream.name_prefix,
            millis,
            std::process::id()
        )
    }

    /// Lifecycle settings for a stream called `stream_name`.
    pub fn scenario_settings(&self, stream_name: impl Into<String>) -> ScenarioSettings {
        ScenarioSettings {
            stream_name: stream_name.into(),
            shard_count: self.stream.shard_count,
            partition_key: self.stream.partition_key.clone(),
            payload: Blob::from(self.stream.payload.as_str()),
            activation: self.retry.activation_policy(),
            visibility: self.retry.visibility_policy(),
            deletion: self.retry.deletion_policy(),
        }
    }
}
