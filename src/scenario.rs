//! End-to-end checks against a stream service.
//!
//! Each scenario drives a [`StreamClient`] through one part of a stream's
//! life, waiting on the service with the probes from [`crate::probe`] and
//! checking what comes back:
//!
//! ```text
//! create ─▶ await ACTIVE ─▶ listed? ─▶ put ─▶ await record ─▶ delete ─▶ await gone
//!           (shard count)                     (payload, seq, key)
//! ```
//!
//! [`run_lifecycle`] runs all of it and deletes the stream even when a check
//! in the middle fails.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::client::{
    Blob, ClientError, CreateStreamInput, DeleteStreamInput, DescribeStreamInput,
    ListStreamsInput, PutRecordInput, Record, StreamClient, StreamDescription,
};
use crate::probe::{await_active, await_deleted, await_single_record, ShardCursor};
use crate::retry::{ProbeFailure, RetryExhausted, RetryPolicy};

/// A scenario step that did not check out.
#[derive(Debug)]
pub enum ScenarioError {
    /// A single, unretried client call failed.
    Client {
        /// Step that made the call.
        step: &'static str,
        /// The client error.
        source: ClientError,
    },
    /// A wait ran out of retries.
    Exhausted {
        /// Step that was waiting.
        step: &'static str,
        /// The last probe failure, with retry bookkeeping.
        source: RetryExhausted<ProbeFailure>,
    },
    /// The service answered, but with the wrong thing.
    Mismatch {
        /// What was compared.
        what: &'static str,
        /// Expected value.
        expected: String,
        /// Value the service returned.
        actual: String,
    },
}

impl ScenarioError {
    fn client(step: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| Self::Client { step, source }
    }

    fn exhausted(step: &'static str) -> impl FnOnce(RetryExhausted<ProbeFailure>) -> Self {
        move |source| Self::Exhausted { step, source }
    }
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { step, source } => write!(f, "{}: {}", step, source),
            Self::Exhausted { step, source } => write!(f, "{}: {}", step, source.final_error),
            Self::Mismatch {
                what,
                expected,
                actual,
            } => write!(f, "{} mismatch: expected {}, got {}", what, expected, actual),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source, .. } => Some(source),
            Self::Exhausted { source, .. } => Some(source),
            Self::Mismatch { .. } => None,
        }
    }
}

fn verify<T: PartialEq + fmt::Debug>(
    what: &'static str,
    expected: T,
    actual: T,
) -> Result<(), ScenarioError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScenarioError::Mismatch {
            what,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        })
    }
}

/// Inputs of [`run_lifecycle`].
#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    /// Stream to create; it must not exist yet.
    pub stream_name: String,
    /// Shards to provision.
    pub shard_count: u32,
    /// Partition key of the test record.
    pub partition_key: String,
    /// Payload of the test record.
    pub payload: Blob,
    /// Wait for the stream to become ACTIVE.
    pub activation: RetryPolicy,
    /// Wait for the test record to become readable.
    pub visibility: RetryPolicy,
    /// Wait for the stream to disappear after deletion.
    pub deletion: RetryPolicy,
}

impl ScenarioSettings {
    /// Defaults for `stream_name`: one shard, record `dat` under key `key`,
    /// 64s to activate, 5 attempts for the record, 64s to delete.
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            shard_count: 1,
            partition_key: "key".to_string(),
            payload: Blob::from("dat"),
            activation: RetryPolicy::within(Duration::from_secs(64)),
            visibility: RetryPolicy::attempts(5),
            deletion: RetryPolicy::within(Duration::from_secs(64)),
        }
    }
}

/// What a successful [`run_lifecycle`] saw.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReport {
    /// Stream that was exercised.
    pub stream_name: String,
    /// Shards the ACTIVE stream reported.
    pub shard_count: usize,
    /// Shard the test record landed in.
    pub shard_id: String,
    /// The test record as read back.
    pub record: Record,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

/// Create a stream, wait for it to become ACTIVE and check its shard count.
pub async fn create_and_await_active<C: StreamClient>(
    client: &C,
    stream_name: &str,
    shard_count: u32,
    policy: &RetryPolicy,
) -> Result<StreamDescription, ScenarioError> {
    client
        .create_stream(CreateStreamInput {
            stream_name: stream_name.to_string(),
            shard_count,
        })
        .await
        .map_err(ScenarioError::client("create stream"))?;

    tracing::info!(stream = stream_name, shard_count, "stream requested, waiting for ACTIVE");

    let mut description = await_active(client, stream_name, policy)
        .await
        .map_err(ScenarioError::exhausted("await active"))?;

    collect_remaining_shards(client, &mut description).await?;
    verify("shard count", shard_count as usize, description.shards.len())?;

    Ok(description)
}

/// Follow `has_more_shards` until the description lists every shard.
async fn collect_remaining_shards<C: StreamClient>(
    client: &C,
    description: &mut StreamDescription,
) -> Result<(), ScenarioError> {
    while description.has_more_shards {
        let last = description.shards.last().map(|s| s.shard_id.clone());
        let page = client
            .describe_stream(DescribeStreamInput {
                stream_name: description.stream_name.clone(),
                limit: None,
                exclusive_start_shard_id: last,
            })
            .await
            .map_err(ScenarioError::client("describe stream"))?
            .stream_description;

        if page.shards.is_empty() {
            break;
        }
        description.shards.extend(page.shards);
        description.has_more_shards = page.has_more_shards;
    }
    Ok(())
}

/// Check that ListStreams includes `stream_name`, following pagination.
pub async fn verify_listed<C: StreamClient>(
    client: &C,
    stream_name: &str,
) -> Result<(), ScenarioError> {
    let mut after = None;
    loop {
        let page = client
            .list_streams(ListStreamsInput {
                limit: None,
                exclusive_start_stream_name: after,
            })
            .await
            .map_err(ScenarioError::client("list streams"))?;

        if page.stream_names.iter().any(|name| name == stream_name) {
            return Ok(());
        }
        if !page.has_more_streams || page.stream_names.is_empty() {
            return Err(ScenarioError::Mismatch {
                what: "listed streams",
                expected: format!("a list containing {:?}", stream_name),
                actual: "a list without it".to_string(),
            });
        }
        after = page.stream_names.last().cloned();
    }
}

/// Write one record and wait until it is the single record in its shard.
///
/// Reads from the oldest record of the shard, so the stream must hold no
/// other records in that shard.
pub async fn put_and_await_visible<C: StreamClient>(
    client: &C,
    stream_name: &str,
    partition_key: &str,
    payload: &Blob,
    policy: &RetryPolicy,
) -> Result<(String, Record), ScenarioError> {
    let put = client
        .put_record(PutRecordInput::new(
            stream_name,
            partition_key,
            payload.clone(),
        ))
        .await
        .map_err(ScenarioError::client("put record"))?;

    tracing::info!(
        stream = stream_name,
        shard = %put.shard_id,
        sequence = %put.sequence_number,
        "record written, waiting for it to be readable"
    );

    let cursor = ShardCursor::trim_horizon(stream_name, put.shard_id.clone());
    let record = await_single_record(client, &cursor, policy)
        .await
        .map_err(ScenarioError::exhausted("await record"))?;

    verify("record payload", payload, &record.data)?;
    verify(
        "sequence number",
        &put.sequence_number,
        &record.sequence_number,
    )?;
    verify("partition key", partition_key, record.partition_key.as_str())?;

    Ok((put.shard_id, record))
}

/// Delete a stream and wait until the service no longer knows it.
pub async fn delete_and_await_gone<C: StreamClient>(
    client: &C,
    stream_name: &str,
    policy: &RetryPolicy,
) -> Result<(), ScenarioError> {
    client
        .delete_stream(DeleteStreamInput {
            stream_name: stream_name.to_string(),
        })
        .await
        .map_err(ScenarioError::client("delete stream"))?;

    await_deleted(client, stream_name, policy)
        .await
        .map_err(ScenarioError::exhausted("await deleted"))
}

/// Run the whole lifecycle against a fresh stream.
///
/// Once the create call has been accepted the stream is always deleted
/// again; if both a check and the clean-up fail, the check's error wins and
/// the clean-up error is logged.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::client::{ConsistencyLag, MemoryStreamClient};
/// use kinesis_probe::scenario::{run_lifecycle, ScenarioSettings};
/// use kinesis_probe::RetryPolicy;
///
/// # tokio_test::block_on(async {
/// let client = MemoryStreamClient::with_lag(ConsistencyLag { activation: 2, visibility: 1, deletion: 1 });
/// let mut settings = ScenarioSettings::new("orders");
/// settings.activation = RetryPolicy::immediate().with_max_retries(6);
/// settings.visibility = RetryPolicy::immediate().with_max_retries(5);
/// settings.deletion = RetryPolicy::immediate().with_max_retries(6);
///
/// let report = run_lifecycle(&client, &settings).await.unwrap();
/// assert_eq!(report.record.data.as_bytes(), b"dat");
/// # });
/// ```
pub async fn run_lifecycle<C: StreamClient>(
    client: &C,
    settings: &ScenarioSettings,
) -> Result<LifecycleReport, ScenarioError> {
    let started = Instant::now();
    let name = settings.stream_name.as_str();

    client
        .create_stream(CreateStreamInput {
            stream_name: name.to_string(),
            shard_count: settings.shard_count,
        })
        .await
        .map_err(ScenarioError::client("create stream"))?;

    let checks = async {
        let mut description = await_active(client, name, &settings.activation)
            .await
            .map_err(ScenarioError::exhausted("await active"))?;
        collect_remaining_shards(client, &mut description).await?;
        verify(
            "shard count",
            settings.shard_count as usize,
            description.shards.len(),
        )?;

        verify_listed(client, name).await?;

        let (shard_id, record) = put_and_await_visible(
            client,
            name,
            &settings.partition_key,
            &settings.payload,
            &settings.visibility,
        )
        .await?;

        Ok::<_, ScenarioError>((description.shards.len(), shard_id, record))
    }
    .await;

    let cleanup = delete_and_await_gone(client, name, &settings.deletion).await;

    let (shard_count, shard_id, record) = match (checks, cleanup) {
        (Ok(seen), Ok(())) => seen,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(cleanup_error)) => {
            tracing::warn!(stream = name, error = %cleanup_error, "clean-up failed");
            return Err(e);
        }
    };

    let report = LifecycleReport {
        stream_name: name.to_string(),
        shard_count,
        shard_id,
        record,
        elapsed: started.elapsed(),
    };

    tracing::info!(
        stream = name,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "lifecycle checks passed"
    );
    Ok(report)
}
