//! Streamable HTTP transport.
//!
//! One logical RPC call per HTTP POST. The server may answer either with a
//! plain JSON document or with a one-event `text/event-stream` body; the
//! `Accept` header advertises both. The transport owns the session token:
//! it is learned from the `Mcp-Session-Id` response header, replayed on every
//! subsequent request, and never invented client-side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use taskdeck_protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, PROTOCOL_VERSION,
    SESSION_HEADER,
};

use crate::error::ClientError;
use crate::sse::SseDecoder;

/// Accept header advertising both reply encodings.
const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Transport configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the server, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// RPC endpoint path.
    pub endpoint_path: String,
    /// Per-call timeout. Bounded and uniform; there is no per-call override.
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            endpoint_path: "/mcp".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Synchronous request/response RPC transport over HTTP.
///
/// Calls are strictly sequential from the caller's point of view; the only
/// state shared across calls is the session token, guarded for callers that
/// drive one transport from several tasks.
#[derive(Debug)]
pub struct HttpTransport {
    config: HttpTransportConfig,
    http: reqwest::Client,
    session: RwLock<Option<String>>,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Build a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: HttpTransportConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            config,
            http,
            session: RwLock::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    fn endpoint_url(&self) -> String {
        format!("{}{}", self.config.base_url, self.config.endpoint_path)
    }

    /// Monotonic request ids. Correlation is trivial in this synchronous
    /// design, but ids stay genuinely unique for future pipelining.
    fn next_request_id(&self) -> RequestId {
        RequestId::from(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Current session token, if one has been issued.
    pub async fn session_token(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    /// Issue one call and decode exactly one reply envelope.
    ///
    /// A reply that carries a protocol-level `error` object is returned
    /// as-is; only transport and decode failures raise here.
    ///
    /// # Errors
    ///
    /// [`ClientError::Encode`] when the request cannot be serialized,
    /// [`ClientError::Transport`] on network failure or timeout,
    /// [`ClientError::Status`] on a non-success HTTP status, and
    /// [`ClientError::Decode`] when the body is not one well-formed message.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<JsonRpcResponse, ClientError> {
        let request = JsonRpcRequest::new(self.next_request_id(), method, params);
        let body = self.post(method, serde_json::to_vec(&request)?).await?;

        let payload = match body {
            ResponseBody::Json(text) => text,
            ResponseBody::EventStream(bytes) => {
                SseDecoder::new(&bytes[..]).read_one_message().await?
            }
            ResponseBody::Empty => {
                return Err(ClientError::Decode(format!(
                    "empty response body for call to {method}"
                )));
            }
        };

        serde_json::from_str(&payload)
            .map_err(|e| ClientError::Decode(format!("malformed reply for {method}: {e}")))
    }

    /// Send a one-way notification; no reply is decoded.
    ///
    /// # Errors
    ///
    /// Same transport failure modes as [`HttpTransport::call`].
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), ClientError> {
        let notification = JsonRpcNotification::new(method, params);
        self.post(method, serde_json::to_vec(&notification)?).await?;
        Ok(())
    }

    async fn post(&self, method: &str, body: Vec<u8>) -> Result<ResponseBody, ClientError> {
        let mut request = self
            .http
            .post(self.endpoint_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, ACCEPT_BOTH)
            .header("Mcp-Protocol-Version", PROTOCOL_VERSION)
            .body(body);

        if let Some(session) = self.session.read().await.as_ref() {
            request = request.header(SESSION_HEADER, session.clone());
        }

        let response = request.send().await.map_err(|e| ClientError::Transport {
            method: method.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                method: method.to_string(),
                status,
                body,
            });
        }

        // Adopt a server-issued session token unconditionally; last writer
        // wins, the token is never merged.
        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            debug!(session, "adopting session token");
            *self.session.write().await = Some(session.to_string());
        }

        if status == reqwest::StatusCode::ACCEPTED {
            return Ok(ResponseBody::Empty);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("text/event-stream") {
            let bytes = response.bytes().await.map_err(|e| ClientError::Transport {
                method: method.to_string(),
                source: e,
            })?;
            Ok(ResponseBody::EventStream(bytes.to_vec()))
        } else {
            let text = response.text().await.map_err(|e| ClientError::Transport {
                method: method.to_string(),
                source: e,
            })?;
            if text.is_empty() {
                Ok(ResponseBody::Empty)
            } else {
                Ok(ResponseBody::Json(text))
            }
        }
    }
}

enum ResponseBody {
    Json(String),
    EventStream(Vec<u8>),
    Empty,
}
