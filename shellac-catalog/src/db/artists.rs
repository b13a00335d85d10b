//! Artist catalog operations

use shellac_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Insert the artist if absent, otherwise return the existing row id
///
/// Artists are keyed by name; repeated sightings of the same name never
/// create a second row.
pub async fn upsert_artist(pool: &SqlitePool, name: &str) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        debug!("Artist already cataloged: {}", name);
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO artists (name, art_file_path) VALUES (?, NULL)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let pool = memory_pool().await;

        let first = upsert_artist(&pool, "Boards of Canada").await.expect("first upsert");
        let second = upsert_artist(&pool, "Boards of Canada").await.expect("second upsert");

        assert_eq!(first, second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_distinct_names_get_distinct_rows() {
        let pool = memory_pool().await;

        let a = upsert_artist(&pool, "Autechre").await.expect("upsert a");
        let b = upsert_artist(&pool, "Aphex Twin").await.expect("upsert b");

        assert_ne!(a, b);
    }
}
