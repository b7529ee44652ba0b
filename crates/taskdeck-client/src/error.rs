//! Client-side error taxonomy.

use taskdeck_protocol::ErrorObject;

/// Everything that can go wrong on the client side of a taskdeck call.
///
/// Protocol-level errors ([`ClientError::Rpc`]) are distinct from transport
/// failures: the raw transport never raises on a reply that carries an
/// `error` object, only the typed operation layer converts it.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Malformed event-stream framing or JSON payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// An outgoing request or notification could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// I/O failure while reading an event stream.
    #[error("stream read failed: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to construct the underlying HTTP client.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Network-level failure (connect, send, receive, timeout).
    #[error("transport error calling {method}: {source}")]
    Transport {
        /// RPC method being called when the failure occurred.
        method: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {status} for {method}: {body}")]
    Status {
        /// RPC method being called.
        method: String,
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Response body, for diagnosis.
        body: String,
    },

    /// The reply carried a protocol-level error object.
    #[error("{method} failed: {error}")]
    Rpc {
        /// RPC method that failed.
        method: String,
        /// The error object from the reply.
        error: ErrorObject,
    },

    /// The initialize exchange failed; the client remains uninitialized.
    #[error("handshake failed: {0}")]
    Handshake(#[source] Box<ClientError>),

    /// An intent was structurally invalid (missing or empty required field).
    #[error("invalid intent: {0}")]
    Validation(String),

    /// An intent named a method outside the supported set.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

impl ClientError {
    /// True when this error came from the reply's `error` object rather than
    /// the transport.
    pub fn is_rpc(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }
}
