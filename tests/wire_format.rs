//! Wire types against service JSON documents.

use serde_json::{json, Value};

use kinesis_probe::client::{
    CreateStreamInput, DescribeStreamOutput, GetRecordsOutput, GetShardIteratorInput,
    ListStreamsOutput, PutRecordInput, ShardIteratorType, StreamStatus,
};

/// Decode `document` as `T`, encode it again and compare.
fn reencodes<T>(document: Value) -> T
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    let decoded: T = serde_json::from_value(document.clone()).unwrap();
    assert_eq!(serde_json::to_value(&decoded).unwrap(), document);
    decoded
}

#[test]
fn describe_stream_response() {
    let output: DescribeStreamOutput = reencodes(json!({
        "StreamDescription": {
            "StreamName": "orders",
            "StreamARN": "arn:aws:kinesis:us-east-1:000000000000:stream/orders",
            "StreamStatus": "ACTIVE",
            "Shards": [
                {
                    "ShardId": "shardId-000000000000",
                    "HashKeyRange": {
                        "StartingHashKey": "0",
                        "EndingHashKey": "170141183460469231731687303715884105727"
                    },
                    "SequenceNumberRange": {
                        "StartingSequenceNumber": "49590338271490256608559692538361571095921575989136588898"
                    }
                },
                {
                    "ShardId": "shardId-000000000001",
                    "ParentShardId": "shardId-000000000000",
                    "HashKeyRange": {
                        "StartingHashKey": "170141183460469231731687303715884105728",
                        "EndingHashKey": "340282366920938463463374607431768211455"
                    },
                    "SequenceNumberRange": {
                        "StartingSequenceNumber": "49590338271512557353758223161503106814194224350642569234",
                        "EndingSequenceNumber": "49590338271512557353758223161503106814194224350642569300"
                    }
                }
            ],
            "HasMoreShards": false,
            "RetentionPeriodHours": 24,
            "StreamCreationTimestamp": 1700000000.5
        }
    }));

    let description = output.stream_description;
    assert_eq!(description.stream_status, StreamStatus::Active);
    assert_eq!(description.shards.len(), 2);
    assert_eq!(
        description.shards[1].parent_shard_id.as_deref(),
        Some("shardId-000000000000")
    );
}

#[test]
fn creating_stream_without_optional_fields() {
    let output: DescribeStreamOutput = reencodes(json!({
        "StreamDescription": {
            "StreamName": "orders",
            "StreamARN": "arn:aws:kinesis:us-east-1:000000000000:stream/orders",
            "StreamStatus": "CREATING",
            "Shards": [],
            "HasMoreShards": false
        }
    }));

    assert_eq!(
        output.stream_description.stream_status,
        StreamStatus::Creating
    );
}

#[test]
fn get_records_response() {
    let output: GetRecordsOutput = reencodes(json!({
        "Records": [
            {
                "SequenceNumber": "49590338271490256608559692540925702759324208523137515618",
                "Data": "ZGF0",
                "PartitionKey": "key",
                "ApproximateArrivalTimestamp": 1700000001.25
            }
        ],
        "NextShardIterator": "AAAAAAAAAAE=",
        "MillisBehindLatest": 0
    }));

    assert_eq!(output.records[0].data.as_bytes(), b"dat");
    assert_eq!(output.records[0].partition_key, "key");
}

#[test]
fn empty_get_records_response() {
    let output: GetRecordsOutput = reencodes(json!({
        "Records": [],
        "NextShardIterator": "AAAAAAAAAAE="
    }));
    assert!(output.records.is_empty());
}

#[test]
fn list_streams_response() {
    let output: ListStreamsOutput = reencodes(json!({
        "StreamNames": ["audit", "orders"],
        "HasMoreStreams": true
    }));
    assert_eq!(output.stream_names, vec!["audit", "orders"]);
}

#[test]
fn request_documents() {
    let create = serde_json::to_value(CreateStreamInput {
        stream_name: "orders".to_string(),
        shard_count: 2,
    })
    .unwrap();
    assert_eq!(create, json!({"StreamName": "orders", "ShardCount": 2}));

    let put = serde_json::to_value(PutRecordInput::new("orders", "key", "dat")).unwrap();
    assert_eq!(
        put,
        json!({"StreamName": "orders", "Data": "ZGF0", "PartitionKey": "key"})
    );

    let iterator = serde_json::to_value(GetShardIteratorInput {
        stream_name: "orders".to_string(),
        shard_id: "shardId-000000000000".to_string(),
        shard_iterator_type: ShardIteratorType::AtSequenceNumber,
        starting_sequence_number: Some("1".to_string()),
    })
    .unwrap();
    assert_eq!(
        iterator,
        json!({
            "StreamName": "orders",
            "ShardId": "shardId-000000000000",
            "ShardIteratorType": "AT_SEQUENCE_NUMBER",
            "StartingSequenceNumber": "1"
        })
    );
}

#[test]
fn invalid_base64_payload_is_rejected() {
    let result = serde_json::from_value::<GetRecordsOutput>(json!({
        "Records": [{"SequenceNumber": "1", "Data": "not base64!", "PartitionKey": "k"}]
    }));
    assert!(result.is_err());
}
