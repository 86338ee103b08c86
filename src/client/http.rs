//! HTTP client speaking the service's JSON 1.1 protocol.
//!
//! Every operation is a `POST /` with the operation named in the
//! `X-Amz-Target` header. Error responses carry
//! `{"__type": "...", "message": "..."}`.
//!
//! Requests are not signed; point the client at an endpoint that does not
//! check signatures (a local emulator) or add the headers it needs with
//! [`HttpStreamClientBuilder::default_headers`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use super::error::ClientError;
use super::types::{
    CreateStreamInput, DeleteStreamInput, DescribeStreamInput, DescribeStreamOutput,
    GetRecordsInput, GetRecordsOutput, GetShardIteratorInput, GetShardIteratorOutput,
    ListStreamsInput, ListStreamsOutput, PutRecordInput, PutRecordOutput,
};
use super::StreamClient;

/// Target prefix of the 2013-12-02 API version.
pub const DEFAULT_TARGET_PREFIX: &str = "Kinesis_20131202";

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_HEADER: &str = "X-Amz-Target";

/// Client for a stream service endpoint.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use kinesis_probe::client::{HttpStreamClient, ListStreamsInput, StreamClient};
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), kinesis_probe::client::ClientError> {
/// let client = HttpStreamClient::builder("http://localhost:4567")
///     .timeout(Duration::from_secs(5))
///     .build()?;
///
/// let listed = client.list_streams(ListStreamsInput::default()).await?;
/// println!("{:?}", listed.stream_names);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpStreamClient {
    http: reqwest::Client,
    endpoint: String,
    target_prefix: String,
}

/// Builder for [`HttpStreamClient`].
#[derive(Debug)]
pub struct HttpStreamClientBuilder {
    endpoint: String,
    target_prefix: String,
    timeout: Option<Duration>,
    headers: HeaderMap,
}

impl HttpStreamClientBuilder {
    /// Per-request deadline, covering connect, send and body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the `X-Amz-Target` prefix.
    pub fn target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = prefix.into();
        self
    }

    /// Headers sent with every request.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpStreamClient, ClientError> {
        let mut headers = self.headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpStreamClient {
            http: builder.build()?,
            endpoint: self.endpoint,
            target_prefix: self.target_prefix,
        })
    }
}

impl HttpStreamClient {
    /// Start building a client for `endpoint`, e.g. `http://localhost:4567`.
    pub fn builder(endpoint: impl Into<String>) -> HttpStreamClientBuilder {
        HttpStreamClientBuilder {
            endpoint: endpoint.into(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            timeout: None,
            headers: HeaderMap::new(),
        }
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<I, O>(&self, operation: &'static str, input: &I) -> Result<O, ClientError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let body = serde_json::to_vec(input)
            .map_err(|e| ClientError::InvalidRequest(format!("{}: {}", operation, e)))?;

        tracing::debug!(operation, endpoint = %self.endpoint, "sending request");

        let response = self
            .http
            .post(&self.endpoint)
            .header(TARGET_HEADER, format!("{}.{}", self.target_prefix, operation))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error = service_error(status, &bytes);
            tracing::debug!(operation, %status, error = %error, "request failed");
            return Err(error);
        }

        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Decode an error response, falling back to the HTTP status when the body
/// is not a service error document.
fn service_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            kind: Some(kind),
            message,
        }) => {
            // "com.amazonaws.kinesis.v20131202#ResourceNotFoundException"
            let code = kind.rsplit('#').next().unwrap_or(&kind);
            ClientError::service(code, message.unwrap_or_default())
        }
        _ => ClientError::service(
            status.to_string(),
            String::from_utf8_lossy(body).into_owned(),
        ),
    }
}

impl StreamClient for HttpStreamClient {
    async fn create_stream(&self, input: CreateStreamInput) -> Result<(), ClientError> {
        let _: IgnoredAny = self.call("CreateStream", &input).await?;
        Ok(())
    }

    async fn describe_stream(
        &self,
        input: DescribeStreamInput,
    ) -> Result<DescribeStreamOutput, ClientError> {
        self.call("DescribeStream", &input).await
    }

    async fn delete_stream(&self, input: DeleteStreamInput) -> Result<(), ClientError> {
        let _: IgnoredAny = self.call("DeleteStream", &input).await?;
        Ok(())
    }

    async fn list_streams(&self, input: ListStreamsInput) -> Result<ListStreamsOutput, ClientError> {
        self.call("ListStreams", &input).await
    }

    async fn put_record(&self, input: PutRecordInput) -> Result<PutRecordOutput, ClientError> {
        self.call("PutRecord", &input).await
    }

    async fn get_shard_iterator(
        &self,
        input: GetShardIteratorInput,
    ) -> Result<GetShardIteratorOutput, ClientError> {
        self.call("GetShardIterator", &input).await
    }

    async fn get_records(&self, input: GetRecordsInput) -> Result<GetRecordsOutput, ClientError> {
        self.call("GetRecords", &input).await
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;

    #[test]
    fn test_service_error_strips_namespace() {
        let body = br#"{"__type":"com.amazonaws.kinesis.v20131202#ResourceInUseException","message":"Stream orders already exists"}"#;
        let err = service_error(StatusCode::BAD_REQUEST, body);
        assert!(err.is_resource_in_use());
        assert_eq!(
            err.to_string(),
            "ResourceInUseException: Stream orders already exists"
        );
    }

    #[test]
    fn test_service_error_accepts_capitalised_message() {
        let body = br#"{"__type":"ResourceNotFoundException","Message":"gone"}"#;
        let err = service_error(StatusCode::BAD_REQUEST, body);
        assert!(err.is_resource_not_found());
        assert_eq!(err.to_string(), "ResourceNotFoundException: gone");
    }

    #[test]
    fn test_service_error_falls_back_to_status() {
        let err = service_error(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.code(), Some("502 Bad Gateway"));
        assert_eq!(err.to_string(), "502 Bad Gateway: upstream down");
    }
}
