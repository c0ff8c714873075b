//! Error types for moodlog-web
//!
//! Only two failures ever reach the client, both as plain text with a 500
//! status. Classification and logging failures are recovered inside the
//! handlers and never become an `ApiError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Uploaded image could not be written; the request is aborted
    #[error("Error saving file.")]
    SaveFailed(#[source] moodlog_common::Error),

    /// Log view could not read the database
    #[error("Error retrieving logs: {0}")]
    LogRetrieval(#[source] moodlog_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::SaveFailed(_) | ApiError::LogRetrieval(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
