//! Probes for the service's eventually consistent transitions.
//!
//! Each probe is one check mapped onto an [`Outcome`]; the `await_*`
//! functions run them under a [`RetryPolicy`]. Client errors become failures
//! like any other, so a throttled or briefly unreachable service is retried
//! too.

use crate::client::{
    DescribeStreamInput, GetRecordsInput, GetShardIteratorInput, Record, ShardIteratorType,
    StreamClient, StreamDescription, StreamStatus,
};
use crate::retry::{retry, Outcome, ProbeFailure, RetryExhausted, RetryPolicy};

/// Reason reported while a stream is not ACTIVE.
pub const NOT_ACTIVE: &str = "stream is not active";

/// Reason reported while a read returns nothing.
pub const NO_RECORDS: &str = "no records visible yet";

/// Reason reported while a deleted stream can still be described.
pub const STILL_EXISTS: &str = "stream still exists";

/// Where to start reading a shard.
///
/// A fresh iterator is requested on every probe, so a cursor can be probed
/// any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCursor {
    /// Stream owning the shard.
    pub stream_name: String,
    /// Shard to read.
    pub shard_id: String,
    /// Starting position.
    pub iterator_type: ShardIteratorType,
    /// Sequence number for the `*_SEQUENCE_NUMBER` iterator types.
    pub starting_sequence_number: Option<String>,
}

impl ShardCursor {
    /// Read `shard_id` from its oldest record.
    pub fn trim_horizon(stream_name: impl Into<String>, shard_id: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            shard_id: shard_id.into(),
            iterator_type: ShardIteratorType::TrimHorizon,
            starting_sequence_number: None,
        }
    }

    /// Read `shard_id` from the record with `sequence_number`.
    pub fn at_sequence(
        stream_name: impl Into<String>,
        shard_id: impl Into<String>,
        sequence_number: impl Into<String>,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            shard_id: shard_id.into(),
            iterator_type: ShardIteratorType::AtSequenceNumber,
            starting_sequence_number: Some(sequence_number.into()),
        }
    }
}

/// Succeeds with the description once the stream is ACTIVE.
pub async fn stream_active<C: StreamClient>(
    client: &C,
    stream_name: &str,
) -> Outcome<StreamDescription> {
    let described = client
        .describe_stream(DescribeStreamInput::new(stream_name))
        .await
        .map_err(ProbeFailure::from_error)?;

    let description = described.stream_description;
    if description.stream_status == StreamStatus::Active {
        Ok(description)
    } else {
        tracing::trace!(stream = stream_name, status = %description.stream_status, "not active yet");
        Err(ProbeFailure::new(NOT_ACTIVE))
    }
}

/// Succeeds with the only record readable from `cursor`.
pub async fn single_record<C: StreamClient>(client: &C, cursor: &ShardCursor) -> Outcome<Record> {
    let iterator = client
        .get_shard_iterator(GetShardIteratorInput {
            stream_name: cursor.stream_name.clone(),
            shard_id: cursor.shard_id.clone(),
            shard_iterator_type: cursor.iterator_type,
            starting_sequence_number: cursor.starting_sequence_number.clone(),
        })
        .await
        .map_err(ProbeFailure::from_error)?
        .shard_iterator;

    let read = client
        .get_records(GetRecordsInput {
            shard_iterator: iterator,
            limit: None,
        })
        .await
        .map_err(ProbeFailure::from_error)?;

    exactly_one(read.records)
}

/// Succeeds once describing the stream reports that it does not exist.
pub async fn stream_deleted<C: StreamClient>(client: &C, stream_name: &str) -> Outcome<()> {
    match client
        .describe_stream(DescribeStreamInput::new(stream_name))
        .await
    {
        Err(e) if e.is_resource_not_found() => Ok(()),
        Err(e) => Err(ProbeFailure::from_error(e)),
        Ok(_) => Err(ProbeFailure::new(STILL_EXISTS)),
    }
}

/// Exactly one record, or a failure saying how many there were.
///
/// Several records is never treated as success, even though waiting longer
/// will not fix it.
///
/// ```rust
/// use kinesis_probe::probe::{exactly_one, NO_RECORDS};
///
/// let none = exactly_one::<u8>(vec![]);
/// assert_eq!(none.unwrap_err().reason(), NO_RECORDS);
///
/// let many = exactly_one(vec![1, 2]);
/// assert_eq!(many.unwrap_err().reason(), "expected exactly one record, found 2");
///
/// assert_eq!(exactly_one(vec![7]), Ok(7));
/// ```
pub fn exactly_one<T>(items: Vec<T>) -> Outcome<T> {
    let count = items.len();
    let mut items = items.into_iter();
    match (items.next(), count) {
        (Some(item), 1) => Ok(item),
        (None, _) => Err(ProbeFailure::new(NO_RECORDS)),
        (Some(_), n) => Err(ProbeFailure::new(format!(
            "expected exactly one record, found {}",
            n
        ))),
    }
}

/// Poll until the stream is ACTIVE.
pub async fn await_active<C: StreamClient>(
    client: &C,
    stream_name: &str,
    policy: &RetryPolicy,
) -> Result<StreamDescription, RetryExhausted<ProbeFailure>> {
    retry(policy, || stream_active(client, stream_name)).await
}

/// Poll until exactly one record is readable from `cursor`.
pub async fn await_single_record<C: StreamClient>(
    client: &C,
    cursor: &ShardCursor,
    policy: &RetryPolicy,
) -> Result<Record, RetryExhausted<ProbeFailure>> {
    retry(policy, || single_record(client, cursor)).await
}

/// Poll until the stream no longer exists.
pub async fn await_deleted<C: StreamClient>(
    client: &C,
    stream_name: &str,
    policy: &RetryPolicy,
) -> Result<(), RetryExhausted<ProbeFailure>> {
    retry(policy, || stream_deleted(client, stream_name)).await
}

#[cfg(test)]
mod probe_tests {
    use super::*;
    use crate::client::{
        ConsistencyLag, CreateStreamInput, DeleteStreamInput, MemoryStreamClient, PutRecordInput,
        THROUGHPUT_EXCEEDED,
    };

    async fn stream(client: &MemoryStreamClient, name: &str, shards: u32) {
        client
            .create_stream(CreateStreamInput {
                stream_name: name.to_string(),
                shard_count: shards,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_await_active_polls_through_creating() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            activation: 3,
            ..Default::default()
        });
        stream(&client, "orders", 2).await;

        let description = await_active(
            &client,
            "orders",
            &RetryPolicy::immediate().with_max_retries(6),
        )
        .await
        .unwrap();

        assert_eq!(description.stream_status, StreamStatus::Active);
        assert_eq!(client.call_counts().describe_stream, 4);
    }

    #[tokio::test]
    async fn test_await_active_reports_fixed_reason() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            activation: 10,
            ..Default::default()
        });
        stream(&client, "orders", 1).await;

        let exhausted = await_active(
            &client,
            "orders",
            &RetryPolicy::immediate().with_max_retries(2),
        )
        .await
        .unwrap_err();

        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.final_error.reason(), NOT_ACTIVE);
    }

    #[tokio::test]
    async fn test_client_errors_are_retried() {
        let client = MemoryStreamClient::new();
        stream(&client, "orders", 1).await;
        client.fail_next(2);

        let result = await_active(
            &client,
            "orders",
            &RetryPolicy::immediate().with_max_retries(2),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_client_error_reason_surfaces_on_exhaustion() {
        let client = MemoryStreamClient::new();
        client.fail_next(5);

        let exhausted = await_active(
            &client,
            "orders",
            &RetryPolicy::immediate().with_max_retries(1),
        )
        .await
        .unwrap_err();

        assert!(exhausted.final_error.reason().starts_with(THROUGHPUT_EXCEEDED));
    }

    #[tokio::test]
    async fn test_single_record_waits_for_visibility() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            visibility: 2,
            ..Default::default()
        });
        stream(&client, "orders", 1).await;
        let put = client
            .put_record(PutRecordInput::new("orders", "key", "dat"))
            .await
            .unwrap();

        let cursor = ShardCursor::trim_horizon("orders", put.shard_id);
        let record = await_single_record(
            &client,
            &cursor,
            &RetryPolicy::immediate().with_max_retries(5),
        )
        .await
        .unwrap();

        assert_eq!(record.sequence_number, put.sequence_number);
        assert_eq!(client.call_counts().get_records, 3);
    }

    #[tokio::test]
    async fn test_two_records_is_a_failure() {
        let client = MemoryStreamClient::new();
        stream(&client, "orders", 1).await;
        let put = client
            .put_record(PutRecordInput::new("orders", "key", "one"))
            .await
            .unwrap();
        client
            .put_record(PutRecordInput::new("orders", "key", "two"))
            .await
            .unwrap();

        let cursor = ShardCursor::trim_horizon("orders", put.shard_id);
        let exhausted = await_single_record(
            &client,
            &cursor,
            &RetryPolicy::immediate().with_max_retries(5),
        )
        .await
        .unwrap_err();

        assert_eq!(
            exhausted.final_error.reason(),
            "expected exactly one record, found 2"
        );
        assert_eq!(exhausted.attempts, 6);
    }

    #[tokio::test]
    async fn test_at_sequence_cursor_skips_older_records() {
        let client = MemoryStreamClient::new();
        stream(&client, "orders", 1).await;
        client
            .put_record(PutRecordInput::new("orders", "key", "old"))
            .await
            .unwrap();
        let put = client
            .put_record(PutRecordInput::new("orders", "key", "new"))
            .await
            .unwrap();

        let cursor = ShardCursor::at_sequence("orders", put.shard_id, put.sequence_number);
        let record = single_record(&client, &cursor).await.unwrap();

        assert_eq!(record.data.as_bytes(), b"new");
    }

    #[tokio::test]
    async fn test_await_deleted() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            deletion: 2,
            ..Default::default()
        });
        stream(&client, "orders", 1).await;
        client
            .delete_stream(DeleteStreamInput {
                stream_name: "orders".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            stream_deleted(&client, "orders").await.unwrap_err().reason(),
            STILL_EXISTS
        );
        await_deleted(
            &client,
            "orders",
            &RetryPolicy::immediate().with_max_retries(3),
        )
        .await
        .unwrap();
    }
}
