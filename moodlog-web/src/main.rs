//! moodlog-web - emotion analysis web service
//!
//! Startup sequence:
//! 1. Parse CLI, load the optional TOML config, initialize tracing
//! 2. Resolve settings (CLI → ENV → TOML → defaults)
//! 3. Open or create the database and the `log` table
//! 4. Create the upload folder
//! 5. Serve HTTP
//!
//! The external analyzer is not touched here; it is initialized on the first
//! analysis request.

use anyhow::{Context, Result};
use clap::Parser;
use moodlog_common::config::{
    load_toml_config, CliOverrides, CompiledDefaults, Settings, TomlConfig, ENV_CONFIG,
};
use moodlog_web::services::{CommandAnalyzer, EmotionClassifier, ImageStore};
use moodlog_web::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments (each overrides the matching env var and TOML key)
#[derive(Parser, Debug)]
#[command(name = "moodlog-web", version, about = "Emotion analysis web service")]
struct Args {
    /// TOML config file
    #[arg(long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Data folder (database and uploads live here by default)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long = "database")]
    database_path: Option<PathBuf>,

    /// Folder for uploaded images
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long)]
    bind: Option<String>,

    /// Analyzer command line, e.g. "deepface-analyze" or "python3 -m emotion_cli"
    #[arg(long = "analyzer")]
    analyzer_program: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            data_dir: self.data_dir.clone(),
            database_path: self.database_path.clone(),
            upload_dir: self.upload_dir.clone(),
            bind: self.bind.clone(),
            analyzer_program: self.analyzer_program.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists so its log level can apply;
    // a failure is reported right after the subscriber is up.
    let toml_result = load_toml_config(args.config.as_deref());
    let default_level = toml_result
        .as_ref()
        .ok()
        .and_then(|c| c.logging.level.clone())
        .unwrap_or_else(|| CompiledDefaults::default().log_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level)),
        )
        .init();

    info!(
        "Starting moodlog-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = toml_result.unwrap_or_else(|e| {
        warn!("{}; continuing without config file", e);
        TomlConfig::default()
    });
    let settings = Settings::resolve(&args.overrides(), &toml_config, &CompiledDefaults::default());

    info!("Database path: {}", settings.database_path.display());
    let pool = moodlog_common::db::init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    let images = ImageStore::new(&settings.upload_dir);
    images.ensure_dir().await.with_context(|| {
        format!("Failed to create upload folder {}", settings.upload_dir.display())
    })?;
    info!("Upload folder: {}", settings.upload_dir.display());

    let analyzer =
        CommandAnalyzer::from_command_line(&settings.analyzer_program, &settings.detector_backend);
    info!(
        program = %settings.analyzer_program,
        detector_backend = %settings.detector_backend,
        "Emotion analyzer configured (initialized on first use)"
    );
    let classifier = EmotionClassifier::new(Arc::new(analyzer));

    let state =
        AppState::new(pool, images, classifier).with_max_upload_bytes(settings.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    info!("moodlog-web listening on http://{}", settings.bind);
    info!("Health check: http://{}/health", settings.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
