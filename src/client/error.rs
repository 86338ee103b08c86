//! Errors returned by stream clients.

use std::fmt;

/// Service error code for a stream or shard that does not exist (yet).
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
/// Service error code for a name that is already taken or a stream that is busy.
pub const RESOURCE_IN_USE: &str = "ResourceInUseException";
/// Service error code for a rejected argument.
pub const INVALID_ARGUMENT: &str = "InvalidArgumentException";
/// Service error code for throttled requests.
pub const THROUGHPUT_EXCEEDED: &str = "ProvisionedThroughputExceededException";
/// Service error code for an expired shard iterator.
pub const EXPIRED_ITERATOR: &str = "ExpiredIteratorException";

/// Error from a client operation.
#[derive(Debug)]
pub enum ClientError {
    /// The request never got an HTTP response.
    Transport(reqwest::Error),
    /// The service answered with an error body.
    Service {
        /// Error type, e.g. `ResourceNotFoundException`.
        code: String,
        /// Human-readable message from the service.
        message: String,
    },
    /// The response body did not have the expected shape.
    Decode(serde_json::Error),
    /// The request was rejected before it was sent.
    InvalidRequest(String),
}

impl ClientError {
    /// Build a service error.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The service error code, if this is a service error.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True when the named stream or shard does not exist.
    pub fn is_resource_not_found(&self) -> bool {
        self.code() == Some(RESOURCE_NOT_FOUND)
    }

    /// True when the stream name is taken or the stream is busy.
    pub fn is_resource_in_use(&self) -> bool {
        self.code() == Some(RESOURCE_IN_USE)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Service { code, message } if message.is_empty() => write!(f, "{}", code),
            Self::Service { code, message } => write!(f, "{}: {}", code, message),
            Self::Decode(e) => write!(f, "unexpected response body: {}", e),
            Self::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Service { .. } | Self::InvalidRequest(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}
