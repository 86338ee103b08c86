//! Typed client interface for the stream service.
//!
//! [`StreamClient`] has one method per service operation. Two
//! implementations ship with the crate:
//!
//! - [`HttpStreamClient`] talks to a real endpoint over the JSON 1.1 protocol.
//! - [`MemoryStreamClient`] keeps streams in process and simulates the
//!   service's eventual consistency, for tests.
//!
//! # Example
//!
//! ```rust
//! use kinesis_probe::client::{CreateStreamInput, DescribeStreamInput, MemoryStreamClient, StreamClient};
//!
//! # tokio_test::block_on(async {
//! let client = MemoryStreamClient::new();
//! client
//!     .create_stream(CreateStreamInput { stream_name: "orders".into(), shard_count: 2 })
//!     .await
//!     .unwrap();
//!
//! let described = client
//!     .describe_stream(DescribeStreamInput::new("orders"))
//!     .await
//!     .unwrap();
//! assert_eq!(described.stream_description.shards.len(), 2);
//! # });
//! ```

use std::future::Future;

mod error;
mod http;
mod memory;
mod types;

pub use error::{
    ClientError, EXPIRED_ITERATOR, INVALID_ARGUMENT, RESOURCE_IN_USE, RESOURCE_NOT_FOUND,
    THROUGHPUT_EXCEEDED,
};
pub use http::{HttpStreamClient, HttpStreamClientBuilder, DEFAULT_TARGET_PREFIX};
pub use memory::{CallCounts, ConsistencyLag, MemoryStreamClient};
pub use types::{
    Blob, CreateStreamInput, DeleteStreamInput, DescribeStreamInput, DescribeStreamOutput,
    GetRecordsInput, GetRecordsOutput, GetShardIteratorInput, GetShardIteratorOutput,
    HashKeyRange, ListStreamsInput, ListStreamsOutput, PutRecordInput, PutRecordOutput, Record,
    SequenceNumberRange, Shard, ShardIteratorType, StreamDescription, StreamStatus,
};

/// Operations of the stream service.
///
/// Every call is a single request; none of them retry. Waiting for the
/// service to catch up is the job of [`crate::retry`].
pub trait StreamClient {
    /// Start creating a stream. The stream is `CREATING` until the service
    /// finishes provisioning it.
    fn create_stream(
        &self,
        input: CreateStreamInput,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Describe a stream: status and shards.
    fn describe_stream(
        &self,
        input: DescribeStreamInput,
    ) -> impl Future<Output = Result<DescribeStreamOutput, ClientError>> + Send;

    /// Start deleting a stream.
    fn delete_stream(
        &self,
        input: DeleteStreamInput,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// List stream names.
    fn list_streams(
        &self,
        input: ListStreamsInput,
    ) -> impl Future<Output = Result<ListStreamsOutput, ClientError>> + Send;

    /// Write one record.
    fn put_record(
        &self,
        input: PutRecordInput,
    ) -> impl Future<Output = Result<PutRecordOutput, ClientError>> + Send;

    /// Get a cursor into a shard.
    fn get_shard_iterator(
        &self,
        input: GetShardIteratorInput,
    ) -> impl Future<Output = Result<GetShardIteratorOutput, ClientError>> + Send;

    /// Read records from a cursor.
    fn get_records(
        &self,
        input: GetRecordsInput,
    ) -> impl Future<Output = Result<GetRecordsOutput, ClientError>> + Send;
}
