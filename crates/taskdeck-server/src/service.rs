//! The production request-handling core.

use serde_json::Value;

use taskdeck_protocol::types::{CallToolResult, GetPromptResult, Implementation, Prompt, Tool};

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::upstream::UpstreamClient;
use crate::{prompts, tools};

/// Handler backed by the upstream task manager.
#[derive(Debug, Clone)]
pub struct TaskdeckService {
    upstream: UpstreamClient,
}

impl TaskdeckService {
    /// Build the service around an upstream client.
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }
}

#[async_trait::async_trait]
impl RpcHandler for TaskdeckService {
    fn server_info(&self) -> Implementation {
        Implementation {
            name: "taskdeck-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, ServerError> {
        Ok(tools::catalog())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, ServerError> {
        tools::call(&self.upstream, name, arguments).await
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServerError> {
        Ok(prompts::catalog())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<GetPromptResult, ServerError> {
        prompts::get(&self.upstream, name, arguments).await
    }
}
