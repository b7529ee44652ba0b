//! Upstream task-manager REST client.
//!
//! The server keeps no state of its own; every tool and prompt reads and
//! writes through this plain HTTP client. The upstream is an opaque
//! synchronous peer with a conventional resource hierarchy: `/api/tasks`,
//! `/api/projects`, `/api/notes`.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::ServerError;

/// One task in the upstream system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Upstream identifier.
    pub id: u64,
    /// Task title.
    pub title: String,
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
    /// Owning project, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    /// Due date as an ISO-8601 date string, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// One project in the upstream system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Upstream identifier.
    pub id: u64,
    /// Project name.
    pub name: String,
}

/// One note in the upstream system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Upstream identifier.
    pub id: u64,
    /// Optional note title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Note body text.
    pub body: String,
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Owning project, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    /// Due date, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// Fields accepted when creating a note.
#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    /// Optional note title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Note body text.
    pub body: String,
}

/// Blocking-style REST client for the upstream task manager.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client against the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::UpstreamTransport`] when the HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// List tasks, optionally filtered by project and completion state.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn list_tasks(
        &self,
        project_id: Option<u64>,
        include_done: bool,
    ) -> Result<Vec<Task>, ServerError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(project_id) = project_id {
            query.push(("project_id", project_id.to_string()));
        }
        if !include_done {
            query.push(("done", "false".to_string()));
        }
        self.get("/api/tasks", &query).await
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ServerError> {
        self.post("/api/tasks", task).await
    }

    /// Mark a task done.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn complete_task(&self, id: u64) -> Result<Task, ServerError> {
        let url = format!("{}/api/tasks/{id}", self.base_url);
        debug!(%url, "PUT upstream");
        let response = self
            .http
            .put(url)
            .json(&serde_json::json!({"done": true}))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List projects.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ServerError> {
        self.get("/api/projects", &[]).await
    }

    /// List notes.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn list_notes(&self) -> Result<Vec<Note>, ServerError> {
        self.get("/api/notes", &[]).await
    }

    /// Create a note.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-success upstream status.
    pub async fn create_note(&self, note: &NewNote) -> Result<Note, ServerError> {
        self.post("/api/notes", note).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServerError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET upstream");
        let response = self.http.get(url).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServerError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST upstream");
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::UpstreamStatus { status, body });
        }
        if status == StatusCode::NO_CONTENT {
            return Err(ServerError::UpstreamStatus {
                status,
                body: "expected a body".to_string(),
            });
        }
        Ok(response.json().await?)
    }
}
