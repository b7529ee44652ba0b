//! Intent dispatch facade.
//!
//! Maps an opaque JSON document of the shape `{"method": ..., "params": ...}`
//! onto the four supported client operations. The method set is a closed
//! enum; anything else is rejected explicitly. For the two parameterized
//! methods the params are pushed through a serde round trip into the strict
//! `{name, arguments}` shape so partially-typed inputs fail loudly instead of
//! reaching the wire.

use serde::Deserialize;
use serde_json::Value;

use taskdeck_protocol::types::NamedArguments;

use crate::client::Client;
use crate::error::ClientError;

/// The closed set of dispatchable intents.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// `tools/list`
    ListTools,
    /// `tools/call` with a validated name/arguments pair.
    CallTool(NamedArguments),
    /// `prompts/list`
    ListPrompts,
    /// `prompts/get` with a validated name/arguments pair.
    GetPrompt(NamedArguments),
}

#[derive(Debug, Deserialize)]
struct RawIntent {
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

/// Parse a raw JSON intent document into an [`Intent`].
///
/// # Errors
///
/// [`ClientError::Decode`] for malformed JSON,
/// [`ClientError::UnsupportedMethod`] for unknown methods, and
/// [`ClientError::Validation`] when a required field is missing or empty.
pub fn parse_intent(raw: &str) -> Result<Intent, ClientError> {
    let raw: RawIntent = serde_json::from_str(raw)
        .map_err(|e| ClientError::Decode(format!("intent is not valid JSON: {e}")))?;

    match raw.method.as_str() {
        "tools/list" => Ok(Intent::ListTools),
        "tools/call" => Ok(Intent::CallTool(named_arguments(raw.params)?)),
        "prompts/list" => Ok(Intent::ListPrompts),
        "prompts/get" => Ok(Intent::GetPrompt(named_arguments(raw.params)?)),
        other => Err(ClientError::UnsupportedMethod(other.to_string())),
    }
}

/// Parse and execute one intent against a client, returning the operation's
/// result as plain JSON for uniform printing.
///
/// # Errors
///
/// Parse failures from [`parse_intent`] plus whatever the underlying
/// operation surfaces.
pub async fn dispatch(client: &Client, raw: &str) -> Result<Value, ClientError> {
    let result = match parse_intent(raw)? {
        Intent::ListTools => serde_json::to_value(client.list_tools().await?),
        Intent::CallTool(call) => {
            serde_json::to_value(client.call_tool(&call.name, call.arguments).await?)
        }
        Intent::ListPrompts => serde_json::to_value(client.list_prompts().await?),
        Intent::GetPrompt(get) => {
            serde_json::to_value(client.get_prompt(&get.name, get.arguments).await?)
        }
    };
    result.map_err(ClientError::Encode)
}

/// Re-parse loosely typed params into the strict `{name, arguments}` shape.
fn named_arguments(params: Option<Value>) -> Result<NamedArguments, ClientError> {
    let params =
        params.ok_or_else(|| ClientError::Validation("missing required field: params".into()))?;

    // Deliberate round trip through the serde model: rejects wrong shapes
    // that a field-by-field lookup would paper over.
    let named: NamedArguments = serde_json::from_value(params)
        .map_err(|e| ClientError::Validation(format!("params did not match {{name, arguments}}: {e}")))?;

    if named.name.is_empty() {
        return Err(ClientError::Validation(
            "missing required field: name".into(),
        ));
    }
    Ok(named)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unparameterized_methods() {
        assert_eq!(
            parse_intent(r#"{"method":"tools/list"}"#).unwrap(),
            Intent::ListTools
        );
        assert_eq!(
            parse_intent(r#"{"method":"prompts/list","params":null}"#).unwrap(),
            Intent::ListPrompts
        );
    }

    #[test]
    fn parses_tool_call_with_name() {
        let intent = parse_intent(r#"{"method":"tools/call","params":{"name":"x"}}"#).unwrap();
        match intent {
            Intent::CallTool(call) => {
                assert_eq!(call.name, "x");
                assert!(call.arguments.is_none());
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn missing_name_is_a_validation_error() {
        let err =
            parse_intent(r#"{"method":"tools/call","params":{"arguments":{}}}"#).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)), "{err}");
    }

    #[test]
    fn empty_name_is_a_validation_error() {
        let err =
            parse_intent(r#"{"method":"prompts/get","params":{"name":""}}"#).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn missing_params_is_a_validation_error() {
        let err = parse_intent(r#"{"method":"tools/call"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = parse_intent(r#"{"method":"resources/list"}"#).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedMethod(m) if m == "resources/list"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_intent("{not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
