//! moodlog-web library - emotion analysis web service
//!
//! Accepts an uploaded photo, asks the external analyzer for the dominant
//! emotion, records the result in the `log` table and shows it back.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use services::{EmotionClassifier, ImageStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool holding the `log` table
    pub db: SqlitePool,
    /// Upload folder
    pub images: ImageStore,
    /// Emotion classifier adapter
    pub classifier: EmotionClassifier,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, images: ImageStore, classifier: EmotionClassifier) -> Self {
        Self {
            db,
            images,
            classifier,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.images.dir());

    Router::new()
        .route("/", get(api::serve_index))
        .route("/analyze", post(api::analyze_image))
        .route("/view-logs-secret", get(api::view_logs))
        .merge(api::health_routes())
        .nest_service(api::pages::UPLOADS_URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
