//! Genre catalog operations

use shellac_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Insert the genre if absent, otherwise return the existing row id
///
/// Genres are keyed by name. Files without a genre tag all land on the
/// single empty-named row rather than failing to catalog.
pub async fn upsert_genre(pool: &SqlitePool, name: &str) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        debug!("Genre already cataloged: \"{}\"", name);
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO genres (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}
