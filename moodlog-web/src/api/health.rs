//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub git_hash: String,
    /// Number of stored analyses; absent when the database is unreadable
    pub log_count: Option<i64>,
}

/// GET /health
///
/// Reports "degraded" when the log table cannot be read.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let log_count = moodlog_common::db::count_logs(&state.db).await.ok();
    let status = if log_count.is_some() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        module: "moodlog-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        log_count,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
