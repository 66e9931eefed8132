//! Integration tests for the task REST API.
//! Spins up the server on a random port and exercises the real HTTP surface.

use serde_json::{json, Value};
use std::sync::Arc;
use taskd::{config::ServerConfig, rest, store::TaskStore, AppContext};
use tempfile::TempDir;

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start the backend on a random port with an empty store.
/// Returns the base URL; the TempDir keeps the test data dir alive.
async fn spawn_backend() -> (String, TempDir) {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    ));
    let ctx = Arc::new(AppContext::new(config, Arc::new(TaskStore::new())));

    tokio::spawn(async move {
        let _ = rest::start_server(ctx).await;
    });

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (format!("http://127.0.0.1:{port}"), dir)
}

#[tokio::test]
async fn test_health_contract() {
    let (base, _dir) = spawn_backend().await;

    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "OK", "status should be the literal OK");
    assert!(body["message"].is_string(), "message should be a string");
    assert!(body["timestamp"].is_string(), "timestamp should be a string");
}

#[tokio::test]
async fn test_list_empty_store() {
    let (base, _dir) = spawn_backend().await;

    let body: Value = reqwest::get(format!("{base}/api/tasks"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_then_list() {
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "first" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "create should return 201");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["title"], "first");
    assert_eq!(body["data"]["completed"], false);
    assert!(body["data"]["createdAt"].is_string());
    assert!(
        body["data"].get("updatedAt").is_none(),
        "updatedAt must be absent until the first update"
    );

    let second: Value = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "second" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["data"]["id"], 2, "ids are strictly incrementing");

    let list: Value = reqwest::get(format!("{base}/api/tasks"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["count"], 2);
    assert_eq!(list["data"][0]["title"], "first", "insertion order preserved");
    assert_eq!(list["data"][1]["title"], "second");
}

#[tokio::test]
async fn test_create_without_title_mutates_nothing() {
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({ "title": "" })] {
        let resp = client
            .post(format!("{base}/api/tasks"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "Title is required");
    }

    let list: Value = reqwest::get(format!("{base}/api/tasks"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["count"], 0, "failed creates must not mutate the store");
}

#[tokio::test]
async fn test_update_unknown_id() {
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/api/tasks/42"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["success"], false);
    assert_eq!(err["error"], "Task not found");
}

#[tokio::test]
async fn test_update_preserves_unspecified_fields() {
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "keep me" }))
        .send()
        .await
        .unwrap();

    let resp = client
        .put(format!("{base}/api/tasks/1"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "keep me", "title untouched");
    assert_eq!(body["data"]["completed"], true);
    assert!(
        body["data"]["updatedAt"].is_string(),
        "updatedAt stamped on update"
    );

    // Unknown fields in the patch are ignored, not merged onto the record.
    let body: Value = client
        .put(format!("{base}/api/tasks/1"))
        .json(&json!({ "title": "renamed", "id": 999, "bogus": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["id"], 1, "id is not patchable");
    assert_eq!(body["data"]["title"], "renamed");
    assert_eq!(body["data"]["completed"], true, "completed preserved");
    assert!(body["data"].get("bogus").is_none());
}

#[tokio::test]
async fn test_create_update_scenario() {
    // Empty store → create "Write spec" → id 1, not completed;
    // update id 1 {completed:true} → same record, completed, updatedAt set.
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "Write spec" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["title"], "Write spec");
    assert_eq!(created["data"]["completed"], false);

    let updated: Value = client
        .put(format!("{base}/api/tasks/1"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["data"]["id"], 1);
    assert_eq!(updated["data"]["title"], "Write spec");
    assert_eq!(updated["data"]["completed"], true);
    assert!(updated["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_cors_allow_list() {
    let (base, _dir) = spawn_backend().await;
    let client = reqwest::Client::new();

    // Default allow-list includes the local development origin.
    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/tasks"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    // Unlisted origins get no CORS grant.
    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/tasks"))
        .header("Origin", "https://evil.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert!(resp
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
