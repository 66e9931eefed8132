// rest/routes/tasks.rs — Task list/create/update routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::store::{StoreError, TaskPatch};
use crate::AppContext;

pub async fn list_tasks(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let tasks = ctx.store.list().await;
    Json(json!({
        "success": true,
        "data": tasks,
        "count": tasks.len(),
    }))
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // A missing title and an empty title get the same 400.
    let title = body.title.unwrap_or_default();
    match ctx.store.create(&title).await {
        Ok(task) => {
            debug!(id = task.id, "task created");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "success": true, "data": task })),
            ))
        }
        Err(e) => Err(store_error(e)),
    }
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<u64>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ctx.store.update(id, patch).await {
        Ok(task) => {
            debug!(id = task.id, "task updated");
            Ok(Json(json!({ "success": true, "data": task })))
        }
        Err(e) => Err(store_error(e)),
    }
}

/// Map a store error onto the `{success:false,error}` envelope.
fn store_error(err: StoreError) -> (StatusCode, Json<Value>) {
    let status = match err {
        StoreError::EmptyTitle => StatusCode::BAD_REQUEST,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
}
