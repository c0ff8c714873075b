//! Log view
//!
//! Unauthenticated; the route path is the only protection.

use axum::{extract::State, response::Html};
use tracing::error;

use super::pages;
use crate::{ApiError, ApiResult, AppState};

/// GET /view-logs-secret
///
/// Every analysis, newest first. A database failure is returned as plain
/// text including the error message.
pub async fn view_logs(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let records = moodlog_common::db::list_logs(&state.db).await.map_err(|e| {
        error!("Error retrieving logs: {}", e);
        ApiError::LogRetrieval(e)
    })?;

    Ok(Html(pages::logs_page(&records)))
}
