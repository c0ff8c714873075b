//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; it is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "MOODLOG_CONFIG";
pub const ENV_DATA_DIR: &str = "MOODLOG_DATA_DIR";
pub const ENV_DATABASE_PATH: &str = "MOODLOG_DATABASE_PATH";
pub const ENV_UPLOAD_DIR: &str = "MOODLOG_UPLOAD_DIR";
pub const ENV_BIND: &str = "MOODLOG_BIND";
pub const ENV_ANALYZER: &str = "MOODLOG_ANALYZER";
pub const ENV_DETECTOR_BACKEND: &str = "MOODLOG_DETECTOR_BACKEND";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MOODLOG_MAX_UPLOAD_BYTES";

/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "database.db";

/// Compiled defaults used when no other tier provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind: String,
    pub analyzer_program: String,
    pub detector_backend: String,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            analyzer_program: "deepface-analyze".to_string(),
            detector_backend: "retinaface".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Analyzer section of the TOML config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub program: Option<String>,
    pub detector_backend: Option<String>,
}

/// TOML configuration file contents
///
/// All fields are optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub max_upload_bytes: Option<usize>,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub analyzer_program: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub bind: String,
    pub max_upload_bytes: usize,
    pub analyzer_program: String,
    pub detector_backend: String,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings against an already-loaded TOML config
    pub fn resolve(
        cli: &CliOverrides,
        toml_config: &TomlConfig,
        defaults: &CompiledDefaults,
    ) -> Self {
        let data_dir = first_of(
            cli.data_dir.clone(),
            env_path(ENV_DATA_DIR),
            toml_config.data_dir.clone(),
        )
        .unwrap_or_else(default_data_dir);

        let database_path = first_of(
            cli.database_path.clone(),
            env_path(ENV_DATABASE_PATH),
            toml_config.database_path.clone(),
        )
        .unwrap_or_else(|| data_dir.join(DATABASE_FILE_NAME));

        let upload_dir = first_of(
            cli.upload_dir.clone(),
            env_path(ENV_UPLOAD_DIR),
            toml_config.upload_dir.clone(),
        )
        .unwrap_or_else(|| data_dir.join("static").join("uploads"));

        let bind = first_of(cli.bind.clone(), env_string(ENV_BIND), toml_config.bind.clone())
            .unwrap_or_else(|| defaults.bind.clone());

        let analyzer_program = first_of(
            cli.analyzer_program.clone(),
            env_string(ENV_ANALYZER),
            toml_config.analyzer.program.clone(),
        )
        .unwrap_or_else(|| defaults.analyzer_program.clone());

        let detector_backend = first_of(
            None,
            env_string(ENV_DETECTOR_BACKEND),
            toml_config.analyzer.detector_backend.clone(),
        )
        .unwrap_or_else(|| defaults.detector_backend.clone());

        let max_upload_bytes = first_of(
            None,
            env_parsed::<usize>(ENV_MAX_UPLOAD_BYTES),
            toml_config.max_upload_bytes,
        )
        .unwrap_or(defaults.max_upload_bytes);

        let log_level = toml_config
            .logging
            .level
            .clone()
            .unwrap_or_else(|| defaults.log_level.clone());

        Self {
            data_dir,
            database_path,
            upload_dir,
            bind,
            max_upload_bytes,
            analyzer_program,
            detector_backend,
            log_level,
        }
    }
}

/// Load the TOML config file
///
/// Lookup order: explicit path, then `MOODLOG_CONFIG`, then the per-user
/// config directory. Returns defaults when no file exists; an explicit path
/// that cannot be read or parsed is an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit.map(Path::to_path_buf).or_else(|| env_path(ENV_CONFIG)) {
        Some(path) => path,
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Per-user config file location (`~/.config/moodlog/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodlog").join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn first_of<T>(cli: Option<T>, env: Option<T>, toml: Option<T>) -> Option<T> {
    cli.or(env).or(toml)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = env_string(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Invalid {key} value {raw:?}: {e}; ignoring");
            None
        }
    }
}
