//! Analysis log store
//!
//! Append-only record of every analysis. Writes are best-effort from the
//! caller's point of view: errors are returned here and the web handler
//! decides to log and swallow them.

use sqlx::SqlitePool;
use tracing::debug;

use super::models::{AnalysisRecord, MAX_IMAGE_FILENAME_LEN, MAX_NAME_LEN, MAX_RESULT_LEN};
use crate::{Error, Result};

/// Insert one analysis record and commit
///
/// Returns the id assigned by the database. On any failure the transaction
/// is dropped, which rolls it back.
pub async fn append_log(
    pool: &SqlitePool,
    name: &str,
    image_filename: &str,
    result: &str,
) -> Result<i64> {
    check_len("name", name, MAX_NAME_LEN)?;
    check_len("image_filename", image_filename, MAX_IMAGE_FILENAME_LEN)?;
    check_len("result", result, MAX_RESULT_LEN)?;

    let mut tx = pool.begin().await?;

    let id = sqlx::query("INSERT INTO log (name, image_filename, result) VALUES (?, ?, ?)")
        .bind(name)
        .bind(image_filename)
        .bind(result)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    tx.commit().await?;

    debug!(id, user = name, image_filename, result, "Appended analysis record");
    Ok(id)
}

/// All records, newest first
pub async fn list_logs(pool: &SqlitePool) -> Result<Vec<AnalysisRecord>> {
    let records = sqlx::query_as::<_, AnalysisRecord>(
        "SELECT id, name, image_filename, result FROM log ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Number of stored records
pub async fn count_logs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::InvalidInput(format!(
            "{field} is {len} characters (limit {max})"
        )));
    }
    Ok(())
}
