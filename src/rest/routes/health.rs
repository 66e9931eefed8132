use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// Liveness probe. Always succeeds; says nothing about the task store.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Task backend is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
