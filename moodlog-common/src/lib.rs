//! # Moodlog Common Library
//!
//! Shared code for the Moodlog crates:
//! - Configuration resolution (CLI → ENV → TOML → defaults)
//! - Database initialization and the analysis log store
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use db::AnalysisRecord;
pub use error::{Error, Result};
