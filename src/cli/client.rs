//! Lightweight HTTP client for the task API.
//!
//! The terminal UI (`taskd ui`) and the status probe (`taskd status`) use
//! this to talk to a running backend.

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{Task, TaskPatch};

/// `GET /api/health` response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// `GET /api/tasks` response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub data: Vec<Task>,
    pub count: usize,
}

/// A short-lived HTTP client for task API calls.
///
/// All requests share a 5-second timeout.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client targeting the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .context("failed to build HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { base_url, http })
    }

    /// Check if the backend is reachable.
    pub async fn is_reachable(&self) -> bool {
        self.health().await.is_ok()
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/api/health", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .context("health request failed")?
            .json::<HealthResponse>()
            .await
            .context("invalid health response")
    }

    pub async fn list_tasks(&self) -> Result<TaskListResponse> {
        let url = format!("{}/api/tasks", self.base_url);
        let list = self
            .http
            .get(&url)
            .send()
            .await
            .context("task list request failed")?
            .json::<TaskListResponse>()
            .await
            .context("invalid task list response")?;
        if !list.success {
            bail!("task list request was not successful");
        }
        Ok(list)
    }

    pub async fn create_task(&self, title: &str) -> Result<Task> {
        let url = format!("{}/api/tasks", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "title": title }))
            .send()
            .await
            .context("create task request failed")?;
        Self::task_from_envelope(resp).await
    }

    pub async fn update_task(&self, id: u64, patch: &TaskPatch) -> Result<Task> {
        let url = format!("{}/api/tasks/{id}", self.base_url);
        let resp = self
            .http
            .put(&url)
            .json(patch)
            .send()
            .await
            .context("update task request failed")?;
        Self::task_from_envelope(resp).await
    }

    /// Unwrap the `{success,data}` envelope, surfacing the server's error
    /// message on failure responses.
    async fn task_from_envelope(resp: reqwest::Response) -> Result<Task> {
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("invalid JSON in task response")?;

        if !status.is_success() || body["success"].as_bool() != Some(true) {
            let message = body["error"].as_str().unwrap_or("unknown error");
            bail!("{message}");
        }
        serde_json::from_value(body["data"].clone()).context("malformed task in response")
    }

    /// Base URL the client is targeting.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
