//! External face/emotion analysis client
//!
//! The emotion model is not part of this crate. `CommandAnalyzer` runs an
//! external analysis tool once per image and reads a JSON array of per-face
//! results from its stdout:
//!
//! ```text
//! <program> [prefix args] --img-path <image> --actions emotion \
//!     --detector-backend <backend> --enforce-detection false
//! ```
//!
//! ```json
//! [{"dominant_emotion": "happy", "emotion": {"happy": 97.1, "sad": 0.4},
//!   "region": {"x": 10, "y": 12, "w": 120, "h": 120}, "face_confidence": 0.99}]
//! ```
//!
//! A tool that prints a single object instead of an array is also accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Face analyzer errors
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Analysis program not found in PATH
    #[error("Analysis program not found: {0}")]
    ProgramNotFound(String),

    /// Failed to spawn or join the analysis program
    #[error("Failed to execute analysis program: {0}")]
    Execution(String),

    /// Analysis program exited unsuccessfully
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Output was not the expected JSON
    #[error("Failed to parse analysis output: {0}")]
    Parse(String),

    /// Image file missing at analysis time
    #[error("Image not found: {0}")]
    ImageNotFound(String),
}

/// Bounding box of a detected face, in pixels
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FaceRegion {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Analysis of one detected face
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FaceAnalysis {
    /// Highest-ranked emotion label, lowercase as reported by the model
    pub dominant_emotion: String,
    /// Score per emotion label
    #[serde(default)]
    pub emotion: BTreeMap<String, f64>,
    #[serde(default)]
    pub region: Option<FaceRegion>,
    #[serde(default)]
    pub face_confidence: Option<f64>,
}

impl FaceAnalysis {
    /// Result with only a dominant emotion set
    pub fn with_dominant(emotion: impl Into<String>) -> Self {
        Self {
            dominant_emotion: emotion.into(),
            emotion: BTreeMap::new(),
            region: None,
            face_confidence: None,
        }
    }
}

/// Face/emotion analysis backend
///
/// Returns one entry per detected face; an empty list means no face was
/// found. Implementations must not treat "no face" as an error.
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &str;

    /// Analyze the image at `image_path`
    async fn analyze(&self, image_path: &Path) -> Result<Vec<FaceAnalysis>, AnalyzerError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzerOutput {
    Faces(Vec<FaceAnalysis>),
    Single(FaceAnalysis),
}

/// Parse the analysis program's stdout
pub fn parse_output(stdout: &[u8]) -> Result<Vec<FaceAnalysis>, AnalyzerError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AnalyzerError::Parse("empty output".to_string()));
    }
    match serde_json::from_str::<AnalyzerOutput>(trimmed) {
        Ok(AnalyzerOutput::Faces(faces)) => Ok(faces),
        Ok(AnalyzerOutput::Single(face)) => Ok(vec![face]),
        Err(e) => Err(AnalyzerError::Parse(e.to_string())),
    }
}

/// Analyzer backed by an external command-line tool
///
/// The program is probed with `--version` on first use, not at
/// construction, so the server starts even when the tool is slow to load or
/// not yet installed. A successful probe is remembered for the process
/// lifetime; a failed one is retried on the next request.
pub struct CommandAnalyzer {
    program: String,
    prefix_args: Vec<String>,
    detector_backend: String,
    ready: OnceCell<()>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, detector_backend: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            detector_backend: detector_backend.into(),
            ready: OnceCell::new(),
        }
    }

    /// Build from a command line such as `"python3 -m emotion_cli"`
    ///
    /// The first whitespace-separated token is the program; the rest are
    /// passed before the analysis arguments.
    pub fn from_command_line(command_line: &str, detector_backend: impl Into<String>) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self::new(program, detector_backend).with_prefix_args(parts.collect())
    }

    pub fn with_prefix_args(mut self, args: Vec<String>) -> Self {
        self.prefix_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed for one analysis, after the prefix args
    pub fn analysis_args(&self, image_path: &Path) -> Vec<OsString> {
        vec![
            "--img-path".into(),
            image_path.as_os_str().to_os_string(),
            "--actions".into(),
            "emotion".into(),
            "--detector-backend".into(),
            self.detector_backend.clone().into(),
            "--enforce-detection".into(),
            "false".into(),
        ]
    }

    async fn ensure_ready(&self) -> Result<(), AnalyzerError> {
        self.ready
            .get_or_try_init(|| async {
                let output = self.run(vec!["--version".into()]).await?;
                if !output.status.success() {
                    return Err(AnalyzerError::Execution(format!(
                        "{} --version exited with {:?}: {}",
                        self.program,
                        output.status.code(),
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
                tracing::info!(
                    program = %self.program,
                    version = %String::from_utf8_lossy(&output.stdout).trim(),
                    "Emotion analyzer initialized"
                );
                Ok::<(), AnalyzerError>(())
            })
            .await
            .map(|_| ())
    }

    async fn run(&self, args: Vec<OsString>) -> Result<std::process::Output, AnalyzerError> {
        if self.program.is_empty() {
            return Err(AnalyzerError::ProgramNotFound("(empty)".to_string()));
        }

        let program = self.program.clone();
        let prefix = self.prefix_args.clone();

        tokio::task::spawn_blocking(move || {
            Command::new(&program).args(&prefix).args(&args).output()
        })
            .await
            .map_err(|e| AnalyzerError::Execution(format!("Task join error: {}", e)))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AnalyzerError::ProgramNotFound(self.program.clone())
                } else {
                    AnalyzerError::Execution(e.to_string())
                }
            })
    }
}

#[async_trait]
impl FaceAnalyzer for CommandAnalyzer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn analyze(&self, image_path: &Path) -> Result<Vec<FaceAnalysis>, AnalyzerError> {
        if !image_path.exists() {
            return Err(AnalyzerError::ImageNotFound(image_path.display().to_string()));
        }

        self.ensure_ready().await?;

        tracing::debug!(
            image = %image_path.display(),
            detector_backend = %self.detector_backend,
            "Running emotion analysis"
        );

        let output = self.run(self.analysis_args(image_path)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::AnalysisFailed(format!(
                "Exit code: {:?}, stderr: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        parse_output(&output.stdout)
    }
}
