//! Client with lazy, exactly-once session handshake.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use taskdeck_protocol::types::{
    CallToolResult, ClientCapabilities, GetPromptResult, Implementation, InitializeParams,
    InitializeResult, ListPromptsResult, ListToolsResult,
};
use taskdeck_protocol::PROTOCOL_VERSION;

use crate::error::ClientError;
use crate::transport::HttpTransport;

/// Handshake progress for one client instance. Terminal once initialized;
/// there is no re-initialization path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    Uninitialized,
    Initialized,
}

/// High-level taskdeck client.
///
/// Every functional operation runs the initialize handshake lazily on first
/// use. A failed handshake leaves the client uninitialized so a later call
/// retries it; a successful one is never repeated.
#[derive(Debug)]
pub struct Client {
    transport: HttpTransport,
    info: Implementation,
    capabilities: ClientCapabilities,
    handshake: Mutex<HandshakeState>,
}

impl Client {
    /// Wrap a transport with the default client identity.
    pub fn new(transport: HttpTransport) -> Self {
        Self::with_info(
            transport,
            Implementation {
                name: "taskdeck-client".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )
    }

    /// Wrap a transport, advertising a custom client identity.
    pub fn with_info(transport: HttpTransport, info: Implementation) -> Self {
        Self {
            transport,
            info,
            capabilities: ClientCapabilities::default(),
            handshake: Mutex::new(HandshakeState::Uninitialized),
        }
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Run the initialize exchange if it has not completed yet.
    ///
    /// The state flips to initialized as soon as the `initialize` call
    /// succeeds; the follow-up `notifications/initialized` acknowledgement is
    /// best-effort and its failure is reported but never propagated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Handshake`] wrapping whatever made the
    /// `initialize` call fail. The client stays uninitialized in that case.
    pub async fn ensure_initialized(&self) -> Result<(), ClientError> {
        let mut state = self.handshake.lock().await;
        if *state == HandshakeState::Initialized {
            return Ok(());
        }

        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities.clone(),
            client_info: self.info.clone(),
        };
        let params = serde_json::to_value(&params).map_err(ClientError::Encode)?;

        let reply = self
            .transport
            .call("initialize", Some(params))
            .await
            .map_err(|e| ClientError::Handshake(Box::new(e)))?;

        let result = reply.into_outcome().map_err(|error| {
            ClientError::Handshake(Box::new(ClientError::Rpc {
                method: "initialize".to_string(),
                error,
            }))
        })?;

        match serde_json::from_value::<InitializeResult>(result) {
            Ok(init) => {
                debug!(
                    server = %init.server_info.name,
                    version = %init.server_info.version,
                    protocol = %init.protocol_version,
                    "handshake complete"
                );
                if init.protocol_version != PROTOCOL_VERSION {
                    warn!(
                        server_protocol = %init.protocol_version,
                        client_protocol = PROTOCOL_VERSION,
                        "server negotiated a different protocol revision"
                    );
                }
            }
            Err(e) => {
                // The server accepted the handshake; an odd result shape is
                // worth a warning but not a failed initialization.
                warn!("initialize result did not parse: {e}");
            }
        }

        // Mark initialized before the acknowledgement so subsequent calls
        // are not blocked on it.
        *state = HandshakeState::Initialized;
        drop(state);

        if let Err(e) = self
            .transport
            .notify("notifications/initialized", Some(json!({})))
            .await
        {
            warn!("initialized notification failed: {e}");
        }

        Ok(())
    }

    /// List the tools the server exposes.
    ///
    /// # Errors
    ///
    /// Handshake, transport, decode, or protocol-level failures.
    pub async fn list_tools(&self) -> Result<ListToolsResult, ClientError> {
        self.request("tools/list", None).await
    }

    /// Call a named tool with optional JSON arguments.
    ///
    /// # Errors
    ///
    /// Handshake, transport, decode, or protocol-level failures.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, ClientError> {
        let params = match arguments {
            Some(arguments) => json!({"name": name, "arguments": arguments}),
            None => json!({"name": name}),
        };
        self.request("tools/call", Some(params)).await
    }

    /// List the prompts the server exposes.
    ///
    /// # Errors
    ///
    /// Handshake, transport, decode, or protocol-level failures.
    pub async fn list_prompts(&self) -> Result<ListPromptsResult, ClientError> {
        self.request("prompts/list", None).await
    }

    /// Fetch a named prompt rendered with optional arguments.
    ///
    /// # Errors
    ///
    /// Handshake, transport, decode, or protocol-level failures.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<GetPromptResult, ClientError> {
        let params = match arguments {
            Some(arguments) => json!({"name": name, "arguments": arguments}),
            None => json!({"name": name}),
        };
        self.request("prompts/get", Some(params)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, ClientError> {
        self.ensure_initialized().await?;

        let reply = self.transport.call(method, params).await?;
        let result = reply.into_outcome().map_err(|error| ClientError::Rpc {
            method: method.to_string(),
            error,
        })?;

        serde_json::from_value(result)
            .map_err(|e| ClientError::Decode(format!("malformed {method} result: {e}")))
    }
}
