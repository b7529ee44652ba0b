//! Server-side error taxonomy.

use taskdeck_protocol::jsonrpc::{error_codes, ErrorObject};

/// Fatal server failures. Tool-level failures are reported inside
/// `CallToolResult` or as JSON-RPC error objects; this type is for faults
/// that take a listener (or the process) down, plus upstream I/O.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Stdio or socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Could not bind the HTTP listener.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested bind address.
        addr: std::net::SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The upstream REST collaborator was unreachable.
    #[error("upstream request failed: {0}")]
    UpstreamTransport(#[from] reqwest::Error),

    /// The upstream REST collaborator answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Response body, for diagnosis.
        body: String,
    },

    /// A listener task panicked or was aborted.
    #[error("listener task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Request or response could not be encoded.
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// A tool or prompt rejected its arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// An unknown tool or prompt name was requested.
    #[error("unknown {kind}: {name}")]
    UnknownName {
        /// `tool` or `prompt`.
        kind: &'static str,
        /// The requested name.
        name: String,
    },
}

impl From<ServerError> for ErrorObject {
    fn from(err: ServerError) -> Self {
        match &err {
            ServerError::InvalidArguments(_) => {
                ErrorObject::new(error_codes::INVALID_PARAMS, err.to_string())
            }
            ServerError::UnknownName { .. } => {
                ErrorObject::new(error_codes::INVALID_PARAMS, err.to_string())
            }
            _ => ErrorObject::new(error_codes::INTERNAL_ERROR, err.to_string()),
        }
    }
}
