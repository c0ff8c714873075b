//! Shared test helpers for moodlog-web integration tests
//!
//! - Temporary database and upload folder per test
//! - Scripted `FaceAnalyzer` mock that records the paths it was given
//! - Hand-built multipart bodies

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use http_body_util::BodyExt;
use moodlog_web::services::{
    AnalyzerError, EmotionClassifier, FaceAnalysis, FaceAnalyzer, ImageStore,
};
use moodlog_web::{build_router, AppState};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BOUNDARY: &str = "moodlog-test-boundary";

/// What the mock analyzer answers
#[derive(Clone)]
pub enum MockOutcome {
    Faces(Vec<FaceAnalysis>),
    Fail(String),
}

/// Scripted analyzer
pub struct MockAnalyzer {
    outcome: MockOutcome,
    seen: Mutex<Vec<PathBuf>>,
}

impl MockAnalyzer {
    pub fn new(outcome: MockOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn dominant(emotion: &str) -> Arc<Self> {
        Self::new(MockOutcome::Faces(vec![FaceAnalysis::with_dominant(emotion)]))
    }

    pub fn no_faces() -> Arc<Self> {
        Self::new(MockOutcome::Faces(Vec::new()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(MockOutcome::Fail(message.to_string()))
    }

    /// Image paths passed to `analyze`, in call order
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaceAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, image_path: &Path) -> Result<Vec<FaceAnalysis>, AnalyzerError> {
        self.seen.lock().unwrap().push(image_path.to_path_buf());
        match &self.outcome {
            MockOutcome::Faces(faces) => Ok(faces.clone()),
            MockOutcome::Fail(message) => Err(AnalyzerError::AnalysisFailed(message.clone())),
        }
    }
}

/// Everything a test needs; the temp dir lives as long as this does
pub struct TestApp {
    pub dir: TempDir,
    pub db: SqlitePool,
    pub images: ImageStore,
    pub analyzer: Arc<MockAnalyzer>,
}

impl TestApp {
    pub async fn new(analyzer: Arc<MockAnalyzer>) -> Self {
        let dir = TempDir::new().unwrap();
        let db = moodlog_common::db::init_database(&dir.path().join("database.db"))
            .await
            .unwrap();
        let images = ImageStore::new(dir.path().join("static").join("uploads"));
        Self {
            dir,
            db,
            images,
            analyzer,
        }
    }

    pub fn state(&self) -> AppState {
        let classifier = EmotionClassifier::new(self.analyzer.clone());
        AppState::new(self.db.clone(), self.images.clone(), classifier)
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state())
    }

    /// Router with a smaller request body limit
    pub fn router_with_limit(&self, max_upload_bytes: usize) -> axum::Router {
        build_router(self.state().with_max_upload_bytes(max_upload_bytes))
    }

    pub async fn log_count(&self) -> i64 {
        moodlog_common::db::count_logs(&self.db).await.unwrap()
    }
}

/// One multipart part
pub enum Part<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, filename: &'a str, contents: &'a [u8] },
}

/// Encode parts as a multipart/form-data body
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, filename, contents } => {
                let disposition = format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                );
                body.extend_from_slice(disposition.as_bytes());
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(contents);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST /analyze with the given parts
pub fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
    analyze_request_raw(multipart_body(parts))
}

/// POST /analyze with a multipart content type and an arbitrary body
pub fn analyze_request_raw(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body as UTF-8 text
pub async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
