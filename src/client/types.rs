//! Request and response shapes of the stream service's JSON API.
//!
//! Field names follow the wire format (PascalCase); optional fields are
//! omitted when absent. Record payloads travel as standard base64.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque binary payload, base64 on the wire.
///
/// # Examples
///
/// ```rust
/// use kinesis_probe::client::Blob;
///
/// let blob = Blob::from("dat");
/// assert_eq!(serde_json::to_string(&blob).unwrap(), "\"ZGF0\"");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the blob and return its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => write!(f, "Blob({:?})", text),
            Err(_) => write!(f, "Blob({} bytes)", self.0.len()),
        }
    }
}

impl From<&str> for Blob {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map(Blob)
            .map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    /// Being provisioned; not yet readable or writable.
    Creating,
    /// Being torn down.
    Deleting,
    /// Ready for reads and writes.
    Active,
    /// Resharding or changing retention; still readable and writable.
    Updating,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamStatus::Creating => "CREATING",
            StreamStatus::Deleting => "DELETING",
            StreamStatus::Active => "ACTIVE",
            StreamStatus::Updating => "UPDATING",
        })
    }
}

/// Where a new shard iterator starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShardIteratorType {
    /// At the record with `starting_sequence_number`.
    AtSequenceNumber,
    /// Just after the record with `starting_sequence_number`.
    AfterSequenceNumber,
    /// At the oldest record in the shard.
    TrimHorizon,
    /// Just after the newest record in the shard.
    Latest,
}

/// Inclusive range of 128-bit hash keys, as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HashKeyRange {
    /// Lowest hash key owned by the shard.
    pub starting_hash_key: String,
    /// Highest hash key owned by the shard.
    pub ending_hash_key: String,
}

/// Sequence numbers a shard has issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SequenceNumberRange {
    /// First sequence number of the shard.
    pub starting_sequence_number: String,
    /// Last sequence number; absent while the shard is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_sequence_number: Option<String>,
}

/// One partition of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shard {
    /// Shard identifier, e.g. `shardId-000000000000`.
    pub shard_id: String,
    /// Shard this one was split from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_shard_id: Option<String>,
    /// Second parent when this shard came from a merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacent_parent_shard_id: Option<String>,
    /// Hash keys routed to this shard.
    pub hash_key_range: HashKeyRange,
    /// Sequence numbers issued by this shard.
    pub sequence_number_range: SequenceNumberRange,
}

/// Description of a stream as returned by DescribeStream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamDescription {
    /// Stream name.
    pub stream_name: String,
    /// Stream ARN.
    #[serde(rename = "StreamARN")]
    pub stream_arn: String,
    /// Current lifecycle state.
    pub stream_status: StreamStatus,
    /// Shards in this page of the description.
    pub shards: Vec<Shard>,
    /// More shards are available past the last one returned.
    pub has_more_shards: bool,
    /// Retention in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period_hours: Option<u32>,
    /// Creation time in fractional epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_creation_timestamp: Option<f64>,
}

/// Input of CreateStream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateStreamInput {
    /// Name of the new stream.
    pub stream_name: String,
    /// Number of shards to provision.
    pub shard_count: u32,
}

/// Input of DeleteStream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteStreamInput {
    /// Stream to delete.
    pub stream_name: String,
}

/// Input of DescribeStream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStreamInput {
    /// Stream to describe.
    pub stream_name: String,
    /// Maximum number of shards to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return shards after this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_shard_id: Option<String>,
}

impl DescribeStreamInput {
    /// Describe `stream_name` from its first shard.
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Self::default()
        }
    }
}

/// Output of DescribeStream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStreamOutput {
    /// The description.
    pub stream_description: StreamDescription,
}

/// Input of ListStreams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListStreamsInput {
    /// Maximum number of names to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return names sorting after this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_stream_name: Option<String>,
}

/// Output of ListStreams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListStreamsOutput {
    /// Stream names in lexical order.
    pub stream_names: Vec<String>,
    /// More names are available.
    pub has_more_streams: bool,
}

/// Input of PutRecord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordInput {
    /// Target stream.
    pub stream_name: String,
    /// Record payload.
    pub data: Blob,
    /// Key hashed to pick the shard.
    pub partition_key: String,
    /// Decimal hash key overriding the partition key hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_hash_key: Option<String>,
    /// Order this record strictly after the given sequence number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number_for_ordering: Option<String>,
}

impl PutRecordInput {
    /// Put `data` under `partition_key`.
    pub fn new(
        stream_name: impl Into<String>,
        partition_key: impl Into<String>,
        data: impl Into<Blob>,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            data: data.into(),
            partition_key: partition_key.into(),
            explicit_hash_key: None,
            sequence_number_for_ordering: None,
        }
    }
}

/// Output of PutRecord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordOutput {
    /// Shard the record landed in.
    pub shard_id: String,
    /// Sequence number assigned to the record.
    pub sequence_number: String,
}

/// Input of GetShardIterator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetShardIteratorInput {
    /// Stream owning the shard.
    pub stream_name: String,
    /// Shard to read.
    pub shard_id: String,
    /// Starting position.
    pub shard_iterator_type: ShardIteratorType,
    /// Required for the `*_SEQUENCE_NUMBER` iterator types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_sequence_number: Option<String>,
}

/// Output of GetShardIterator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetShardIteratorOutput {
    /// Opaque cursor for GetRecords.
    pub shard_iterator: String,
}

/// Input of GetRecords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRecordsInput {
    /// Cursor from GetShardIterator or a previous GetRecords.
    pub shard_iterator: String,
    /// Maximum number of records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// A data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// Sequence number within the shard.
    pub sequence_number: String,
    /// Payload.
    pub data: Blob,
    /// Partition key the record was written with.
    pub partition_key: String,
    /// Arrival time in fractional epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_arrival_timestamp: Option<f64>,
}

/// Output of GetRecords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRecordsOutput {
    /// Records read, possibly none.
    pub records: Vec<Record>,
    /// Cursor for the next read; absent once the shard is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_shard_iterator: Option<String>,
    /// How far behind the tip of the shard this read was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub millis_behind_latest: Option<u64>,
}
