//! Prompt catalog: insight text built from upstream data.

use serde_json::Value;

use taskdeck_protocol::types::{Content, GetPromptResult, Prompt, PromptArgument, PromptMessage};

use crate::error::ServerError;
use crate::tools::format_tasks;
use crate::upstream::UpstreamClient;

/// Every prompt this server advertises via `prompts/list`.
pub fn catalog() -> Vec<Prompt> {
    vec![
        Prompt {
            name: "daily_focus".into(),
            description: Some("Summarize open tasks and suggest a focus for today".into()),
            arguments: Vec::new(),
        },
        Prompt {
            name: "project_status".into(),
            description: Some("Summarize the state of one project".into()),
            arguments: vec![PromptArgument {
                name: "project_id".into(),
                description: Some("Upstream project id".into()),
                required: true,
            }],
        },
    ]
}

/// Render one prompt by name.
///
/// # Errors
///
/// [`ServerError::UnknownName`] for a name outside the catalog,
/// [`ServerError::InvalidArguments`] for bad arguments, and upstream errors
/// when the data behind the prompt cannot be fetched.
pub async fn get(
    upstream: &UpstreamClient,
    name: &str,
    arguments: Option<Value>,
) -> Result<GetPromptResult, ServerError> {
    match name {
        "daily_focus" => daily_focus(upstream).await,
        "project_status" => project_status(upstream, arguments).await,
        other => Err(ServerError::UnknownName {
            kind: "prompt",
            name: other.to_string(),
        }),
    }
}

async fn daily_focus(upstream: &UpstreamClient) -> Result<GetPromptResult, ServerError> {
    let tasks = upstream.list_tasks(None, false).await?;
    let text = format!(
        "Here are my open tasks:\n\n{}\n\nPick the three I should focus on today \
         and explain the ordering briefly.",
        format_tasks(&tasks)
    );
    Ok(message("Daily focus suggestion", text))
}

async fn project_status(
    upstream: &UpstreamClient,
    arguments: Option<Value>,
) -> Result<GetPromptResult, ServerError> {
    let project_id = arguments
        .as_ref()
        .and_then(|a| a.get("project_id"))
        .and_then(value_as_u64)
        .ok_or_else(|| {
            ServerError::InvalidArguments("project_status requires a numeric project_id".into())
        })?;

    let tasks = upstream.list_tasks(Some(project_id), true).await?;
    let open = tasks.iter().filter(|t| !t.done).count();
    let done = tasks.len() - open;
    let text = format!(
        "Project #{project_id} has {done} completed and {open} open tasks:\n\n{}\n\n\
         Write a short status update for the team.",
        format_tasks(&tasks)
    );
    Ok(message("Project status summary", text))
}

/// Prompt arguments often arrive as strings; accept both encodings.
fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn message(description: &str, text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage {
            role: "user".into(),
            content: Content::text(text),
        }],
    }
}
