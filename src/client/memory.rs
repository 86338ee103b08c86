//! In-process stream service for tests.
//!
//! Behaves like the remote service closely enough to exercise the retry
//! engine: new streams stay `CREATING` for a while, fresh records take a few
//! reads to show up, deleted streams linger as `DELETING`. All lags are
//! counted in calls rather than wall-clock time, which keeps tests
//! deterministic.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::error::{
    ClientError, EXPIRED_ITERATOR, INVALID_ARGUMENT, RESOURCE_IN_USE, RESOURCE_NOT_FOUND,
    THROUGHPUT_EXCEEDED,
};
use super::types::{
    CreateStreamInput, DeleteStreamInput, DescribeStreamInput, DescribeStreamOutput,
    GetRecordsInput, GetRecordsOutput, GetShardIteratorInput, GetShardIteratorOutput,
    HashKeyRange, ListStreamsInput, ListStreamsOutput, PutRecordInput, PutRecordOutput, Record,
    SequenceNumberRange, Shard, ShardIteratorType, StreamDescription, StreamStatus,
};
use super::StreamClient;

const ACCOUNT_ID: &str = "000000000000";
const REGION: &str = "us-east-1";
const RETENTION_HOURS: u32 = 24;
const MAX_PARTITION_KEY_LEN: usize = 256;
const MAX_GET_RECORDS: usize = 10_000;

/// How many calls each eventual-consistency transition takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsistencyLag {
    /// DescribeStream calls answered with `CREATING` after a create.
    pub activation: u32,
    /// GetRecords calls on a shard before a new record in it is returned.
    pub visibility: u32,
    /// DescribeStream calls answered with `DELETING` after a delete.
    pub deletion: u32,
}

/// Calls made so far, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// DescribeStream calls.
    pub describe_stream: u32,
    /// GetShardIterator calls.
    pub get_shard_iterator: u32,
    /// GetRecords calls.
    pub get_records: u32,
}

/// In-memory [`StreamClient`].
///
/// Clones share the same streams.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::client::{
///     ConsistencyLag, CreateStreamInput, DescribeStreamInput, MemoryStreamClient, StreamClient,
///     StreamStatus,
/// };
///
/// # tokio_test::block_on(async {
/// let client = MemoryStreamClient::with_lag(ConsistencyLag { activation: 1, ..Default::default() });
/// client
///     .create_stream(CreateStreamInput { stream_name: "orders".into(), shard_count: 1 })
///     .await
///     .unwrap();
///
/// let status = |out: kinesis_probe::client::DescribeStreamOutput| out.stream_description.stream_status;
/// let first = client.describe_stream(DescribeStreamInput::new("orders")).await.unwrap();
/// let second = client.describe_stream(DescribeStreamInput::new("orders")).await.unwrap();
/// assert_eq!(status(first), StreamStatus::Creating);
/// assert_eq!(status(second), StreamStatus::Active);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStreamClient {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    lag: ConsistencyLag,
    streams: BTreeMap<String, StreamState>,
    last_sequence: u128,
    injected_failures: u32,
    calls: CallCounts,
}

#[derive(Debug)]
struct StreamState {
    status: StreamStatus,
    /// Describe calls left before the next status transition.
    countdown: u32,
    created_at: f64,
    shards: Vec<ShardState>,
}

#[derive(Debug)]
struct ShardState {
    shard: Shard,
    low: u128,
    high: u128,
    records: Vec<StoredRecord>,
}

#[derive(Debug)]
struct StoredRecord {
    sequence: u128,
    record: Record,
    hidden_reads: u32,
}

impl MemoryStreamClient {
    /// A service with no lag: streams are active at once and records are
    /// readable immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// A service with the given lag.
    pub fn with_lag(lag: ConsistencyLag) -> Self {
        let client = Self::default();
        client.lock().lag = lag;
        client
    }

    /// Make the next `n` calls, of any operation, fail with
    /// `ProvisionedThroughputExceededException`.
    pub fn fail_next(&self, n: u32) {
        self.lock().injected_failures = n;
    }

    /// Calls made so far.
    pub fn call_counts(&self) -> CallCounts {
        self.lock().calls
    }

    /// Current status of a stream without advancing any lag.
    pub fn stream_status(&self, stream_name: &str) -> Option<StreamStatus> {
        self.lock().streams.get(stream_name).map(|s| s.status)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_state<T>(
        &self,
        op: impl FnOnce(&mut State) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let mut state = self.lock();
        state.take_injected_failure()?;
        op(&mut state)
    }
}

impl State {
    fn take_injected_failure(&mut self) -> Result<(), ClientError> {
        if self.injected_failures == 0 {
            return Ok(());
        }
        self.injected_failures -= 1;
        Err(ClientError::service(THROUGHPUT_EXCEEDED, "Rate exceeded"))
    }

    fn create_stream(&mut self, input: CreateStreamInput) -> Result<(), ClientError> {
        let CreateStreamInput {
            stream_name,
            shard_count,
        } = input;

        if stream_name.is_empty() {
            return Err(ClientError::service(
                INVALID_ARGUMENT,
                "StreamName must not be empty",
            ));
        }
        if shard_count == 0 {
            return Err(ClientError::service(
                INVALID_ARGUMENT,
                "ShardCount must be at least 1",
            ));
        }
        if self.streams.contains_key(&stream_name) {
            return Err(ClientError::service(
                RESOURCE_IN_USE,
                format!("Stream {} already exists", stream_name),
            ));
        }

        let shards = split_hash_space(shard_count)
            .map(|(index, low, high)| {
                self.last_sequence += 1;
                ShardState {
                    shard: Shard {
                        shard_id: format!("shardId-{:012}", index),
                        parent_shard_id: None,
                        adjacent_parent_shard_id: None,
                        hash_key_range: HashKeyRange {
                            starting_hash_key: low.to_string(),
                            ending_hash_key: high.to_string(),
                        },
                        sequence_number_range: SequenceNumberRange {
                            starting_sequence_number: format_sequence(self.last_sequence),
                            ending_sequence_number: None,
                        },
                    },
                    low,
                    high,
                    records: Vec::new(),
                }
            })
            .collect();

        let status = if self.lag.activation == 0 {
            StreamStatus::Active
        } else {
            StreamStatus::Creating
        };

        tracing::debug!(stream = %stream_name, shard_count, %status, "stream created");

        self.streams.insert(
            stream_name,
            StreamState {
                status,
                countdown: self.lag.activation,
                created_at: now_epoch_secs(),
                shards,
            },
        );
        Ok(())
    }

    fn describe_stream(
        &mut self,
        input: DescribeStreamInput,
    ) -> Result<DescribeStreamOutput, ClientError> {
        self.calls.describe_stream += 1;
        let name = input.stream_name;

        let stream = self
            .streams
            .get_mut(&name)
            .ok_or_else(|| stream_not_found(&name))?;

        match stream.status {
            StreamStatus::Creating if stream.countdown == 0 => {
                stream.status = StreamStatus::Active;
                tracing::debug!(stream = %name, "stream became active");
            }
            StreamStatus::Deleting if stream.countdown == 0 => {
                self.streams.remove(&name);
                tracing::debug!(stream = %name, "stream removed");
                return Err(stream_not_found(&name));
            }
            StreamStatus::Creating | StreamStatus::Deleting => stream.countdown -= 1,
            StreamStatus::Active | StreamStatus::Updating => {}
        }

        let start = match &input.exclusive_start_shard_id {
            Some(after) => stream
                .shards
                .iter()
                .position(|s| s.shard.shard_id > *after)
                .unwrap_or(stream.shards.len()),
            None => 0,
        };
        let remaining = &stream.shards[start..];
        let limit = input.limit.map_or(remaining.len(), |l| l as usize);
        let shards: Vec<Shard> = remaining
            .iter()
            .take(limit)
            .map(|s| s.shard.clone())
            .collect();

        Ok(DescribeStreamOutput {
            stream_description: StreamDescription {
                stream_arn: format!(
                    "arn:aws:kinesis:{}:{}:stream/{}",
                    REGION, ACCOUNT_ID, name
                ),
                stream_name: name,
                stream_status: stream.status,
                has_more_shards: shards.len() < remaining.len(),
                shards,
                retention_period_hours: Some(RETENTION_HOURS),
                stream_creation_timestamp: Some(stream.created_at),
            },
        })
    }

    fn delete_stream(&mut self, input: DeleteStreamInput) -> Result<(), ClientError> {
        let name = input.stream_name;
        let lag = self.lag.deletion;

        let stream = self
            .streams
            .get_mut(&name)
            .ok_or_else(|| stream_not_found(&name))?;

        if lag == 0 {
            self.streams.remove(&name);
        } else {
            stream.status = StreamStatus::Deleting;
            stream.countdown = lag;
        }

        tracing::debug!(stream = %name, "stream deleted");
        Ok(())
    }

    fn list_streams(&self, input: ListStreamsInput) -> Result<ListStreamsOutput, ClientError> {
        let names: Vec<&String> = self
            .streams
            .keys()
            .filter(|name| match &input.exclusive_start_stream_name {
                Some(after) => *name > after,
                None => true,
            })
            .collect();

        let limit = input.limit.map_or(names.len(), |l| l as usize);

        Ok(ListStreamsOutput {
            has_more_streams: names.len() > limit,
            stream_names: names.into_iter().take(limit).cloned().collect(),
        })
    }

    fn put_record(&mut self, input: PutRecordInput) -> Result<PutRecordOutput, ClientError> {
        if input.partition_key.is_empty() || input.partition_key.len() > MAX_PARTITION_KEY_LEN {
            return Err(ClientError::service(
                INVALID_ARGUMENT,
                format!(
                    "PartitionKey must be 1 to {} characters",
                    MAX_PARTITION_KEY_LEN
                ),
            ));
        }

        let hash_key = match &input.explicit_hash_key {
            Some(explicit) => explicit.parse::<u128>().map_err(|_| {
                ClientError::service(
                    INVALID_ARGUMENT,
                    format!("ExplicitHashKey {} is not a 128-bit integer", explicit),
                )
            })?,
            None => hash_partition_key(&input.partition_key),
        };

        let visibility = self.lag.visibility;
        self.last_sequence += 1;
        let sequence = self.last_sequence;

        let stream = writable_stream(&mut self.streams, &input.stream_name)?;
        let shard = stream
            .shards
            .iter_mut()
            .find(|s| s.low <= hash_key && hash_key <= s.high)
            .ok_or_else(|| {
                ClientError::service(INVALID_ARGUMENT, "hash key is outside every shard")
            })?;

        let sequence_number = format_sequence(sequence);
        shard.records.push(StoredRecord {
            sequence,
            record: Record {
                sequence_number: sequence_number.clone(),
                data: input.data,
                partition_key: input.partition_key,
                approximate_arrival_timestamp: Some(now_epoch_secs()),
            },
            hidden_reads: visibility,
        });

        Ok(PutRecordOutput {
            shard_id: shard.shard.shard_id.clone(),
            sequence_number,
        })
    }

    fn get_shard_iterator(
        &mut self,
        input: GetShardIteratorInput,
    ) -> Result<GetShardIteratorOutput, ClientError> {
        self.calls.get_shard_iterator += 1;

        let stream = writable_stream(&mut self.streams, &input.stream_name)?;
        let shard = find_shard(stream, &input.stream_name, &input.shard_id)?;

        let starting = || {
            input
                .starting_sequence_number
                .as_deref()
                .ok_or_else(|| {
                    ClientError::service(
                        INVALID_ARGUMENT,
                        "StartingSequenceNumber is required for this iterator type",
                    )
                })
                .and_then(parse_sequence)
        };

        let position = match input.shard_iterator_type {
            ShardIteratorType::TrimHorizon => 0,
            ShardIteratorType::Latest => shard.records.len(),
            ShardIteratorType::AtSequenceNumber => {
                let at = starting()?;
                shard.records.partition_point(|r| r.sequence < at)
            }
            ShardIteratorType::AfterSequenceNumber => {
                let after = starting()?;
                shard.records.partition_point(|r| r.sequence <= after)
            }
        };

        Ok(GetShardIteratorOutput {
            shard_iterator: encode_iterator(&input.stream_name, &input.shard_id, position),
        })
    }

    fn get_records(&mut self, input: GetRecordsInput) -> Result<GetRecordsOutput, ClientError> {
        self.calls.get_records += 1;

        let (stream_name, shard_id, position) = decode_iterator(&input.shard_iterator)?;
        let stream = writable_stream(&mut self.streams, &stream_name)?;
        let shard = find_shard(stream, &stream_name, &shard_id)?;

        let limit = input
            .limit
            .map_or(MAX_GET_RECORDS, |l| (l as usize).min(MAX_GET_RECORDS));
        let records: Vec<Record> = shard
            .records
            .iter()
            .skip(position)
            .take_while(|r| r.hidden_reads == 0)
            .take(limit)
            .map(|r| r.record.clone())
            .collect();

        for stored in shard.records.iter_mut() {
            stored.hidden_reads = stored.hidden_reads.saturating_sub(1);
        }

        let next = position + records.len();
        Ok(GetRecordsOutput {
            millis_behind_latest: Some(0),
            next_shard_iterator: Some(encode_iterator(&stream_name, &shard_id, next)),
            records,
        })
    }
}

impl StreamClient for MemoryStreamClient {
    async fn create_stream(&self, input: CreateStreamInput) -> Result<(), ClientError> {
        self.with_state(|state| state.create_stream(input))
    }

    async fn describe_stream(
        &self,
        input: DescribeStreamInput,
    ) -> Result<DescribeStreamOutput, ClientError> {
        self.with_state(|state| state.describe_stream(input))
    }

    async fn delete_stream(&self, input: DeleteStreamInput) -> Result<(), ClientError> {
        self.with_state(|state| state.delete_stream(input))
    }

    async fn list_streams(&self, input: ListStreamsInput) -> Result<ListStreamsOutput, ClientError> {
        self.with_state(|state| state.list_streams(input))
    }

    async fn put_record(&self, input: PutRecordInput) -> Result<PutRecordOutput, ClientError> {
        self.with_state(|state| state.put_record(input))
    }

    async fn get_shard_iterator(
        &self,
        input: GetShardIteratorInput,
    ) -> Result<GetShardIteratorOutput, ClientError> {
        self.with_state(|state| state.get_shard_iterator(input))
    }

    async fn get_records(&self, input: GetRecordsInput) -> Result<GetRecordsOutput, ClientError> {
        self.with_state(|state| state.get_records(input))
    }
}

fn stream_not_found(name: &str) -> ClientError {
    ClientError::service(
        RESOURCE_NOT_FOUND,
        format!("Stream {} under account {} not found.", name, ACCOUNT_ID),
    )
}

/// Streams accept reads and writes only once they are active.
fn writable_stream<'a>(
    streams: &'a mut BTreeMap<String, StreamState>,
    name: &str,
) -> Result<&'a mut StreamState, ClientError> {
    match streams.get_mut(name) {
        Some(stream)
            if matches!(stream.status, StreamStatus::Active | StreamStatus::Updating) =>
        {
            Ok(stream)
        }
        _ => Err(stream_not_found(name)),
    }
}

fn find_shard<'a>(
    stream: &'a mut StreamState,
    stream_name: &str,
    shard_id: &str,
) -> Result<&'a mut ShardState, ClientError> {
    stream
        .shards
        .iter_mut()
        .find(|s| s.shard.shard_id == shard_id)
        .ok_or_else(|| {
            ClientError::service(
                RESOURCE_NOT_FOUND,
                format!("Shard {} in stream {} not found.", shard_id, stream_name),
            )
        })
}

/// Split the 128-bit hash key space into `count` contiguous ranges.
fn split_hash_space(count: u32) -> impl Iterator<Item = (u32, u128, u128)> {
    let width = u128::MAX / u128::from(count);
    (0..count).map(move |index| {
        let low = width * u128::from(index);
        let high = if index + 1 == count {
            u128::MAX
        } else {
            low + width - 1
        };
        (index, low, high)
    })
}

fn hash_partition_key(key: &str) -> u128 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let h = hasher.finish();
    (u128::from(h) << 64) | u128::from(h.rotate_left(32))
}

fn format_sequence(sequence: u128) -> String {
    format!("{:056}", sequence)
}

fn parse_sequence(raw: &str) -> Result<u128, ClientError> {
    raw.parse().map_err(|_| {
        ClientError::service(
            INVALID_ARGUMENT,
            format!("{} is not a valid sequence number", raw),
        )
    })
}

fn encode_iterator(stream_name: &str, shard_id: &str, position: usize) -> String {
    BASE64.encode(format!("{}|{}|{}", stream_name, shard_id, position))
}

fn decode_iterator(iterator: &str) -> Result<(String, String, usize), ClientError> {
    let invalid = || ClientError::service(EXPIRED_ITERATOR, "Iterator is invalid or expired");

    let raw = BASE64.decode(iterator).map_err(|_| invalid())?;
    let raw = String::from_utf8(raw).map_err(|_| invalid())?;
    let mut parts = raw.rsplitn(3, '|');
    let position = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let shard_id = parts.next().ok_or_else(invalid)?;
    let stream_name = parts.next().ok_or_else(invalid)?;

    Ok((stream_name.to_string(), shard_id.to_string(), position))
}

fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    fn create(name: &str, shards: u32) -> CreateStreamInput {
        CreateStreamInput {
            stream_name: name.to_string(),
            shard_count: shards,
        }
    }

    async fn iterator(client: &MemoryStreamClient, name: &str, shard_id: &str) -> String {
        client
            .get_shard_iterator(GetShardIteratorInput {
                stream_name: name.to_string(),
                shard_id: shard_id.to_string(),
                shard_iterator_type: ShardIteratorType::TrimHorizon,
                starting_sequence_number: None,
            })
            .await
            .unwrap()
            .shard_iterator
    }

    #[test]
    fn test_hash_space_is_covered_without_gaps() {
        for count in 1..8u32 {
            let ranges: Vec<_> = split_hash_space(count).collect();
            assert_eq!(ranges.first().map(|r| r.1), Some(0));
            assert_eq!(ranges.last().map(|r| r.2), Some(u128::MAX));
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].2 + 1, pair[1].1);
            }
        }
    }

    #[test]
    fn test_iterator_survives_encoding() {
        let encoded = encode_iterator("orders", "shardId-000000000001", 17);
        assert_eq!(
            decode_iterator(&encoded).unwrap(),
            ("orders".to_string(), "shardId-000000000001".to_string(), 17)
        );
        assert_eq!(
            decode_iterator("garbage").unwrap_err().code(),
            Some(EXPIRED_ITERATOR)
        );
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_zero_shards() {
        let client = MemoryStreamClient::new();
        client.create_stream(create("orders", 1)).await.unwrap();

        let dup = client.create_stream(create("orders", 1)).await.unwrap_err();
        assert!(dup.is_resource_in_use());

        let zero = client.create_stream(create("empty", 0)).await.unwrap_err();
        assert_eq!(zero.code(), Some(INVALID_ARGUMENT));
    }

    #[tokio::test]
    async fn test_put_before_active_is_not_found() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            activation: 3,
            ..Default::default()
        });
        client.create_stream(create("orders", 1)).await.unwrap();

        let err = client
            .put_record(PutRecordInput::new("orders", "key", "dat"))
            .await
            .unwrap_err();
        assert!(err.is_resource_not_found());
        assert_eq!(client.stream_status("orders"), Some(StreamStatus::Creating));
    }

    #[tokio::test]
    async fn test_records_become_visible_after_lag() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            visibility: 2,
            ..Default::default()
        });
        client.create_stream(create("orders", 1)).await.unwrap();
        let put = client
            .put_record(PutRecordInput::new("orders", "key", "dat"))
            .await
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let it = iterator(&client, "orders", &put.shard_id).await;
            let out = client
                .get_records(GetRecordsInput {
                    shard_iterator: it,
                    limit: None,
                })
                .await
                .unwrap();
            seen.push(out.records.len());
        }

        assert_eq!(seen, vec![0, 0, 1]);
    }

    #[tokio::test]
    async fn test_sequence_iterators() {
        let client = MemoryStreamClient::new();
        client.create_stream(create("orders", 1)).await.unwrap();
        let first = client
            .put_record(PutRecordInput::new("orders", "k", "one"))
            .await
            .unwrap();
        client
            .put_record(PutRecordInput::new("orders", "k", "two"))
            .await
            .unwrap();

        let read = |kind| {
            let client = client.clone();
            let input = GetShardIteratorInput {
                stream_name: "orders".to_string(),
                shard_id: first.shard_id.clone(),
                shard_iterator_type: kind,
                starting_sequence_number: Some(first.sequence_number.clone()),
            };
            async move {
                let it = client.get_shard_iterator(input).await.unwrap().shard_iterator;
                client
                    .get_records(GetRecordsInput {
                        shard_iterator: it,
                        limit: None,
                    })
                    .await
                    .unwrap()
                    .records
                    .len()
            }
        };

        assert_eq!(read(ShardIteratorType::AtSequenceNumber).await, 2);
        assert_eq!(read(ShardIteratorType::AfterSequenceNumber).await, 1);
        assert_eq!(read(ShardIteratorType::Latest).await, 0);
    }

    #[tokio::test]
    async fn test_delete_lingers_then_disappears() {
        let client = MemoryStreamClient::with_lag(ConsistencyLag {
            deletion: 1,
            ..Default::default()
        });
        client.create_stream(create("orders", 1)).await.unwrap();
        client
            .delete_stream(DeleteStreamInput {
                stream_name: "orders".to_string(),
            })
            .await
            .unwrap();

        let first = client
            .describe_stream(DescribeStreamInput::new("orders"))
            .await
            .unwrap();
        assert_eq!(first.stream_description.stream_status, StreamStatus::Deleting);

        let second = client
            .describe_stream(DescribeStreamInput::new("orders"))
            .await
            .unwrap_err();
        assert!(second.is_resource_not_found());
        assert_eq!(client.stream_status("orders"), None);
    }

    #[tokio::test]
    async fn test_list_streams_pages_in_order() {
        let client = MemoryStreamClient::new();
        for name in ["c", "a", "b"] {
            client.create_stream(create(name, 1)).await.unwrap();
        }

        let page = client
            .list_streams(ListStreamsInput {
                limit: Some(2),
                exclusive_start_stream_name: None,
            })
            .await
            .unwrap();
        assert_eq!(page.stream_names, vec!["a", "b"]);
        assert!(page.has_more_streams);

        let rest = client
            .list_streams(ListStreamsInput {
                limit: Some(2),
                exclusive_start_stream_name: Some("b".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(rest.stream_names, vec!["c"]);
        assert!(!rest.has_more_streams);
    }

    #[tokio::test]
    async fn test_describe_pages_shards() {
        let client = MemoryStreamClient::new();
        client.create_stream(create("orders", 3)).await.unwrap();

        let page = client
            .describe_stream(DescribeStreamInput {
                stream_name: "orders".to_string(),
                limit: Some(2),
                exclusive_start_shard_id: None,
            })
            .await
            .unwrap()
            .stream_description;
        assert_eq!(page.shards.len(), 2);
        assert!(page.has_more_shards);

        let rest = client
            .describe_stream(DescribeStreamInput {
                stream_name: "orders".to_string(),
                limit: None,
                exclusive_start_shard_id: Some(page.shards[1].shard_id.clone()),
            })
            .await
            .unwrap()
            .stream_description;
        assert_eq!(rest.shards.len(), 1);
        assert!(!rest.has_more_shards);
    }

    #[tokio::test]
    async fn test_explicit_hash_key_routes_to_last_shard() {
        let client = MemoryStreamClient::new();
        client.create_stream(create("orders", 4)).await.unwrap();

        let mut input = PutRecordInput::new("orders", "key", "dat");
        input.explicit_hash_key = Some(u128::MAX.to_string());
        let put = client.put_record(input).await.unwrap();

        assert_eq!(put.shard_id, "shardId-000000000003");
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let client = MemoryStreamClient::new();
        client.fail_next(2);

        for _ in 0..2 {
            let err = client
                .list_streams(ListStreamsInput::default())
                .await
                .unwrap_err();
            assert_eq!(err.code(), Some(THROUGHPUT_EXCEEDED));
        }
        assert!(client.list_streams(ListStreamsInput::default()).await.is_ok());
    }
}
