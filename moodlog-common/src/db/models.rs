//! Database models

use serde::{Deserialize, Serialize};

/// Column limits of the `log` table
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_IMAGE_FILENAME_LEN: usize = 200;
pub const MAX_RESULT_LEN: usize = 50;

/// One row of the `log` table: a single completed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalysisRecord {
    pub id: i64,
    pub name: String,
    pub image_filename: String,
    pub result: String,
}
