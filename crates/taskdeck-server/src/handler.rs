//! The seam between transports and the domain procedures.

use serde_json::Value;

use taskdeck_protocol::types::{CallToolResult, GetPromptResult, Implementation, Prompt, Tool};

use crate::error::ServerError;

/// Request-handling core shared by every listener.
///
/// Implementations must be cheaply cloneable; each listener task holds its
/// own clone.
#[async_trait::async_trait]
pub trait RpcHandler: Clone + Send + Sync + 'static {
    /// Server identity advertised in the initialize result.
    fn server_info(&self) -> Implementation;

    /// Tools this server exposes.
    async fn list_tools(&self) -> Result<Vec<Tool>, ServerError>;

    /// Execute a named tool.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, ServerError>;

    /// Prompts this server exposes.
    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServerError>;

    /// Render a named prompt.
    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<GetPromptResult, ServerError>;
}
