//! Services used by the request handlers
//!
//! - **Image store** (`image_store`): sanitized filesystem storage for uploads
//! - **Face analyzer** (`face_analyzer`): the external emotion analysis tool
//! - **Emotion classifier** (`emotion_classifier`): reduces analyzer output
//!   to a single display label

pub mod emotion_classifier;
pub mod face_analyzer;
pub mod image_store;

pub use emotion_classifier::{EmotionClassifier, ANALYSIS_ERROR_LABEL, NO_FACE_LABEL};
pub use face_analyzer::{AnalyzerError, CommandAnalyzer, FaceAnalysis, FaceAnalyzer, FaceRegion};
pub use image_store::{sanitize_filename, ImageStore};
