//! Emotion classifier adapter
//!
//! Wraps a [`FaceAnalyzer`] and reduces its output to one display label.
//! Classification never fails from the caller's point of view: every
//! problem becomes a sentinel label that is stored and shown like a normal
//! result.

use moodlog_common::db::MAX_RESULT_LEN;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::face_analyzer::{FaceAnalysis, FaceAnalyzer};

/// Label used when the analyzer finds no face in the image
pub const NO_FACE_LABEL: &str = "No face detected";

/// Label used when analysis fails for any reason
pub const ANALYSIS_ERROR_LABEL: &str = "Analysis error";

/// Emotion classifier shared by all requests
#[derive(Clone)]
pub struct EmotionClassifier {
    analyzer: Arc<dyn FaceAnalyzer>,
}

impl EmotionClassifier {
    pub fn new(analyzer: Arc<dyn FaceAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Classify the image at `image_path`
    ///
    /// Returns the first face's dominant emotion, capitalized, or one of
    /// [`NO_FACE_LABEL`] / [`ANALYSIS_ERROR_LABEL`].
    pub async fn classify(&self, image_path: &Path) -> String {
        info!(
            image = %image_path.display(),
            analyzer = self.analyzer.name(),
            "Analyzing image"
        );

        match self.analyzer.analyze(image_path).await {
            Ok(faces) => label_for_faces(&faces),
            Err(e) => {
                error!("Error during emotion analysis: {}", e);
                ANALYSIS_ERROR_LABEL.to_string()
            }
        }
    }
}

/// Reduce per-face results to a single label (first face wins)
///
/// Labels that would not fit the `result` column count as analysis errors.
pub fn label_for_faces(faces: &[FaceAnalysis]) -> String {
    let Some(first) = faces.first() else {
        warn!("No face detected in the image");
        return NO_FACE_LABEL.to_string();
    };

    let emotion = first.dominant_emotion.trim();
    if emotion.is_empty() {
        error!("Analyzer reported a face without a dominant emotion");
        return ANALYSIS_ERROR_LABEL.to_string();
    }

    let label = capitalize(emotion);
    let len = label.chars().count();
    if len > MAX_RESULT_LEN {
        error!(len, limit = MAX_RESULT_LEN, "Analyzer emotion label too long to store");
        return ANALYSIS_ERROR_LABEL.to_string();
    }

    info!(dominant_emotion = emotion, faces = faces.len(), "Dominant emotion");
    label
}

/// Uppercase the first character and lowercase the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
