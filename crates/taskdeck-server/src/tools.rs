//! Tool catalog: task, project and note procedures.
//!
//! Argument shapes are validated through serde before anything touches the
//! upstream. Upstream failures are reported inside the tool result
//! (`is_error`) rather than as protocol errors; only malformed arguments and
//! unknown tool names surface as JSON-RPC errors.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use taskdeck_protocol::types::{CallToolResult, Tool};

use crate::error::ServerError;
use crate::upstream::{NewNote, NewTask, Task, UpstreamClient};

/// Every tool this server advertises via `tools/list`.
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool {
            name: "list_tasks".into(),
            description: Some("List tasks, optionally filtered by project and completion".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_id": {"type": "integer"},
                    "include_done": {"type": "boolean", "default": false}
                }
            }),
        },
        Tool {
            name: "create_task".into(),
            description: Some("Create a task".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "project_id": {"type": "integer"},
                    "due": {"type": "string", "format": "date"}
                },
                "required": ["title"]
            }),
        },
        Tool {
            name: "complete_task".into(),
            description: Some("Mark a task as done".into()),
            input_schema: json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}},
                "required": ["id"]
            }),
        },
        Tool {
            name: "list_projects".into(),
            description: Some("List projects".into()),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        Tool {
            name: "list_notes".into(),
            description: Some("List notes".into()),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        Tool {
            name: "add_note".into(),
            description: Some("Create a note".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "body": {"type": "string"}
                },
                "required": ["body"]
            }),
        },
    ]
}

#[derive(Debug, Default, Deserialize)]
struct ListTasksArgs {
    #[serde(default)]
    project_id: Option<u64>,
    #[serde(default)]
    include_done: bool,
}

#[derive(Debug, Deserialize)]
struct CreateTaskArgs {
    title: String,
    #[serde(default)]
    project_id: Option<u64>,
    #[serde(default)]
    due: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompleteTaskArgs {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct AddNoteArgs {
    #[serde(default)]
    title: Option<String>,
    body: String,
}

/// Execute one tool by name.
///
/// # Errors
///
/// [`ServerError::UnknownName`] for a name outside the catalog and
/// [`ServerError::InvalidArguments`] when the arguments do not match the
/// tool's schema.
pub async fn call(
    upstream: &UpstreamClient,
    name: &str,
    arguments: Option<Value>,
) -> Result<CallToolResult, ServerError> {
    match name {
        "list_tasks" => {
            let args: ListTasksArgs = parse_args(arguments)?;
            run(upstream
                .list_tasks(args.project_id, args.include_done)
                .await
                .map(|tasks| format_tasks(&tasks)))
        }
        "create_task" => {
            let args: CreateTaskArgs = parse_args(arguments)?;
            if args.title.trim().is_empty() {
                return Err(ServerError::InvalidArguments("title must not be empty".into()));
            }
            let new_task = NewTask {
                title: args.title,
                project_id: args.project_id,
                due: args.due,
            };
            run(upstream
                .create_task(&new_task)
                .await
                .map(|task| format!("Created task #{}: {}", task.id, task.title)))
        }
        "complete_task" => {
            let args: CompleteTaskArgs = parse_args(arguments)?;
            run(upstream
                .complete_task(args.id)
                .await
                .map(|task| format!("Completed task #{}: {}", task.id, task.title)))
        }
        "list_projects" => run(upstream.list_projects().await.map(|projects| {
            if projects.is_empty() {
                "No projects.".to_string()
            } else {
                projects
                    .iter()
                    .map(|p| format!("#{} {}", p.id, p.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        })),
        "list_notes" => run(upstream.list_notes().await.map(|notes| {
            if notes.is_empty() {
                "No notes.".to_string()
            } else {
                notes
                    .iter()
                    .map(|n| match &n.title {
                        Some(title) => format!("#{} {}: {}", n.id, title, n.body),
                        None => format!("#{} {}", n.id, n.body),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        })),
        "add_note" => {
            let args: AddNoteArgs = parse_args(arguments)?;
            if args.body.trim().is_empty() {
                return Err(ServerError::InvalidArguments("body must not be empty".into()));
            }
            let new_note = NewNote {
                title: args.title,
                body: args.body,
            };
            run(upstream
                .create_note(&new_note)
                .await
                .map(|note| format!("Created note #{}", note.id)))
        }
        other => Err(ServerError::UnknownName {
            kind: "tool",
            name: other.to_string(),
        }),
    }
}

/// Upstream outcomes become tool results; failures stay inside the result.
fn run(outcome: Result<String, ServerError>) -> Result<CallToolResult, ServerError> {
    match outcome {
        Ok(text) => Ok(CallToolResult::text(text)),
        Err(e) => {
            warn!("tool execution failed: {e}");
            Ok(CallToolResult::error(e.to_string()))
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, ServerError> {
    let arguments = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(arguments).map_err(|e| ServerError::InvalidArguments(e.to_string()))
}

/// Render tasks one per line with completion markers.
pub(crate) fn format_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    tasks
        .iter()
        .map(|task| {
            let marker = if task.done { "[x]" } else { "[ ]" };
            let due = task
                .due
                .as_deref()
                .map(|d| format!(" (due {d})"))
                .unwrap_or_default();
            format!("{marker} #{} {}{due}", task.id, task.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
