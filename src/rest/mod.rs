// rest/mod.rs — Public REST API server.
//
// Axum HTTP server exposing the task-list contract:
//   GET  /api/health
//   GET  /api/tasks
//   POST /api/tasks
//   PUT  /api/tasks/{id}
//
// Cross-origin access is restricted to the configured allow-list.

pub mod routes;

use anyhow::{Context as _, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::AppContext;

pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{bind}'"))?;

    let router = build_router(ctx);

    info!("backend listening on http://{}", addr);
    info!("health check: http://{}/api/health", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = cors_layer(&ctx.config.cors_origins);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/api/tasks/{id}", put(routes::tasks::update_task))
        .layer(cors)
        .with_state(ctx)
}

/// CORS layer over the explicit origin allow-list.
///
/// Origins that fail to parse as header values are skipped with a warning
/// rather than aborting startup.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "invalid CORS origin in config — skipped");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
