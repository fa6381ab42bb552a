//! Health, admin and file-server routes

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::observability::{MetricsRegistry, MetricsSnapshot};

use super::state::AppState;

/// Health check, mounted under /api
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/reset", post(reset_handler))
}

/// Admin routes, mounted under /admin
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics_page_handler))
        .route("/stats", get(stats_handler))
        .route("/reset", post(reset_handler))
}

/// Middleware counting every request that reaches the file server
pub async fn count_fileserver_hit(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    metrics.increment_fileserver_hits();
    next.run(request).await
}

/// Admin page body for a hit count
pub fn metrics_page(hits: u64) -> String {
    format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        hits
    )
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

async fn metrics_page_handler(State(state): State<AppState>) -> Html<String> {
    Html(metrics_page(state.metrics.fileserver_hits()))
}

async fn stats_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn reset_handler(State(state): State<AppState>) -> StatusCode {
    state.metrics.reset_hits();
    tracing::info!("file-server hit counter reset");
    StatusCode::OK
}
