// SPDX-License-Identifier: MIT
//! In-memory task store.
//!
//! Owns the ordered list of tasks for the lifetime of the process. Nothing
//! is persisted — a restart starts from an empty list. Tasks are only ever
//! appended and mutated in place; there is no delete operation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A single to-do record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    /// RFC 3339 creation stamp, set once.
    pub created_at: String,
    /// RFC 3339 stamp of the last update. Absent until the first update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The accepted update surface for `PUT /api/tasks/:id`.
///
/// Only these fields can be patched onto a task; anything else in the
/// request body is ignored. Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Errors returned by the store.
///
/// The display strings double as the wire-level error messages.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Task not found")]
    NotFound { id: u64 },
}

/// Ordered in-memory collection of tasks plus the id counter.
///
/// Ids come from a monotonic counter and are never reused.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
    next_id: AtomicU64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tasks in insertion order.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Append a new task with the given title.
    ///
    /// The title must be non-empty. Whitespace-only titles are accepted
    /// here — trimming is the client's concern.
    pub async fn create(&self, title: &str) -> Result<Task, StoreError> {
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let task = Task {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            title: title.to_owned(),
            completed: false,
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    /// Apply a patch to the task with the given id and stamp `updatedAt`.
    ///
    /// Fields absent from the patch keep their current values.
    pub async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Some(Utc::now().to_rfc3339());
        Ok(task.clone())
    }

    /// Preload the three demo tasks the original deployment shipped with.
    /// Only called from `taskd serve --seed`; the default store is empty.
    pub async fn seed_demo(&self) {
        let seeds = [
            ("Learn Rust", true),
            ("Build the task API", false),
            ("Deploy the backend", false),
        ];
        let mut tasks = self.tasks.write().await;
        for (title, completed) in seeds {
            tasks.push(Task {
                id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                title: title.to_owned(),
                completed,
                created_at: Utc::now().to_rfc3339(),
                updated_at: None,
            });
        }
    }
}
