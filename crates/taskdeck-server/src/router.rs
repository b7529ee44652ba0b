//! JSON-RPC request routing.
//!
//! One inbound message either is a call (has an `id`, gets exactly one
//! reply) or a notification (no `id`, gets none). Routing is an exhaustive
//! match over the supported method set; unknown methods are rejected with
//! `METHOD_NOT_FOUND` rather than falling through.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use taskdeck_protocol::jsonrpc::{error_codes, ErrorObject, JsonRpcResponse, RequestId};
use taskdeck_protocol::types::{
    InitializeResult, ListPromptsResult, ListToolsResult, NamedArguments, ServerCapabilities,
};
use taskdeck_protocol::PROTOCOL_VERSION;

use crate::handler::RpcHandler;

/// Inbound message shape: a call when `id` is present, a notification
/// otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcIncoming {
    /// Present for calls, absent for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Parse one raw JSON document into an incoming message.
///
/// Returns an error reply (with null id, per JSON-RPC) when the document is
/// not parseable.
pub fn parse_request(raw: &str) -> Result<JsonRpcIncoming, JsonRpcResponse> {
    serde_json::from_str(raw).map_err(|e| {
        JsonRpcResponse::error(
            None,
            ErrorObject::new(error_codes::PARSE_ERROR, format!("invalid request: {e}")),
        )
    })
}

/// Route one message to the handler.
///
/// Returns `None` for notifications, which never receive a reply.
pub async fn route_request<H: RpcHandler>(
    handler: &H,
    request: JsonRpcIncoming,
) -> Option<JsonRpcResponse> {
    let Some(id) = request.id else {
        handle_notification(&request.method);
        return None;
    };

    debug!(method = %request.method, %id, "routing request");

    let outcome = match request.method.as_str() {
        "initialize" => initialize(handler, request.params),
        "ping" => Ok(Value::Object(serde_json::Map::new())),
        "tools/list" => handler
            .list_tools()
            .await
            .map(|tools| encode(ListToolsResult { tools }))
            .map_err(ErrorObject::from),
        "tools/call" => match named_arguments(request.params) {
            Ok(named) => handler
                .call_tool(&named.name, named.arguments)
                .await
                .map(encode)
                .map_err(ErrorObject::from),
            Err(e) => Err(e),
        },
        "prompts/list" => handler
            .list_prompts()
            .await
            .map(|prompts| encode(ListPromptsResult { prompts }))
            .map_err(ErrorObject::from),
        "prompts/get" => match named_arguments(request.params) {
            Ok(named) => handler
                .get_prompt(&named.name, named.arguments)
                .await
                .map(encode)
                .map_err(ErrorObject::from),
            Err(e) => Err(e),
        },
        other => Err(ErrorObject::new(
            error_codes::METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        )),
    };

    Some(match outcome {
        Ok(result) => JsonRpcResponse::result(id, result),
        Err(error) => JsonRpcResponse::error(Some(id), error),
    })
}

fn handle_notification(method: &str) {
    match method {
        "notifications/initialized" => debug!("client acknowledged initialization"),
        other => debug!(method = other, "ignoring notification"),
    }
}

fn initialize<H: RpcHandler>(handler: &H, params: Option<Value>) -> Result<Value, ErrorObject> {
    let params = params.unwrap_or_default();

    // clientInfo with name and version is mandatory in the handshake.
    let client_info = params.get("clientInfo").ok_or_else(|| {
        ErrorObject::new(
            error_codes::INVALID_PARAMS,
            "missing required field: clientInfo",
        )
    })?;
    let name = client_info.get("name").and_then(Value::as_str);
    let version = client_info.get("version").and_then(Value::as_str);
    if name.is_none() || version.is_none() {
        return Err(ErrorObject::new(
            error_codes::INVALID_PARAMS,
            "clientInfo must contain 'name' and 'version'",
        ));
    }

    debug!(
        client = name.unwrap_or_default(),
        version = version.unwrap_or_default(),
        "initialize"
    );

    Ok(encode(InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: true,
            prompts: true,
        },
        server_info: handler.server_info(),
    }))
}

fn named_arguments(params: Option<Value>) -> Result<NamedArguments, ErrorObject> {
    let params = params.ok_or_else(|| {
        ErrorObject::new(error_codes::INVALID_PARAMS, "missing required field: params")
    })?;
    let named: NamedArguments = serde_json::from_value(params).map_err(|e| {
        ErrorObject::new(
            error_codes::INVALID_PARAMS,
            format!("params did not match {{name, arguments}}: {e}"),
        )
    })?;
    if named.name.is_empty() {
        return Err(ErrorObject::new(
            error_codes::INVALID_PARAMS,
            "missing required field: name",
        ));
    }
    Ok(named)
}

/// Serialize a typed result; our result types never fail to encode.
fn encode<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskdeck_protocol::types::{CallToolResult, GetPromptResult, Implementation, Prompt, Tool};

    use crate::error::ServerError;

    #[derive(Clone)]
    struct StubHandler;

    #[async_trait::async_trait]
    impl RpcHandler for StubHandler {
        fn server_info(&self) -> Implementation {
            Implementation {
                name: "stub".into(),
                version: "0.0.0".into(),
            }
        }

        async fn list_tools(&self) -> Result<Vec<Tool>, ServerError> {
            Ok(vec![Tool {
                name: "list_tasks".into(),
                description: None,
                input_schema: json!({"type": "object"}),
            }])
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: Option<Value>,
        ) -> Result<CallToolResult, ServerError> {
            Ok(CallToolResult::text(format!("called {name}")))
        }

        async fn list_prompts(&self) -> Result<Vec<Prompt>, ServerError> {
            Ok(Vec::new())
        }

        async fn get_prompt(
            &self,
            name: &str,
            _arguments: Option<Value>,
        ) -> Result<GetPromptResult, ServerError> {
            Err(ServerError::UnknownName {
                kind: "prompt",
                name: name.to_string(),
            })
        }
    }

    fn call(method: &str, params: Option<Value>) -> JsonRpcIncoming {
        JsonRpcIncoming {
            id: Some(RequestId::from(1i64)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_requires_client_info() {
        let response = route_request(&StubHandler, call("initialize", Some(json!({}))))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert!(error.message.contains("clientInfo"));
    }

    #[tokio::test]
    async fn initialize_returns_server_info_and_protocol() {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        });
        let response = route_request(&StubHandler, call("initialize", Some(params)))
            .await
            .unwrap();
        let result = response.into_outcome().unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "stub");
        assert_eq!(result["capabilities"]["tools"], true);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let request = JsonRpcIncoming {
            id: None,
            method: "notifications/initialized".into(),
            params: None,
        };
        assert!(route_request(&StubHandler, request).await.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let response = route_request(&StubHandler, call("resources/list", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tools_call_requires_name() {
        let response = route_request(
            &StubHandler,
            call("tools/call", Some(json!({"arguments": {}}))),
        )
        .await
        .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn tools_call_routes_to_handler() {
        let response = route_request(
            &StubHandler,
            call("tools/call", Some(json!({"name": "x"}))),
        )
        .await
        .unwrap();
        let result = response.into_outcome().unwrap();
        assert_eq!(result["content"][0]["text"], "called x");
    }

    #[tokio::test]
    async fn handler_errors_become_error_objects() {
        let response = route_request(
            &StubHandler,
            call("prompts/get", Some(json!({"name": "missing"}))),
        )
        .await
        .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert!(error.message.contains("missing"));
    }

    #[test]
    fn parse_error_reply_has_null_id() {
        let response = parse_request("{oops").unwrap_err();
        assert!(response.id.is_none());
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }
}
