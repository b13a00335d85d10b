//! Album catalog operations

use shellac_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Insert the album if absent, otherwise refresh it and return the
/// existing row id
///
/// Albums are keyed by (title, artist). On a hit the stored release
/// date is refreshed only when the scanned year is non-zero; a file
/// with no year tag never clobbers a known release date.
pub async fn upsert_album(pool: &SqlitePool, title: &str, artist_id: i64, year: u32) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM albums WHERE title = ? AND artist_id = ?")
            .bind(title)
            .bind(artist_id)
            .fetch_optional(pool)
            .await?;

    if let Some(id) = existing {
        debug!("Album already cataloged: \"{}\"", title);
        if year != 0 {
            sqlx::query("UPDATE albums SET release_date = ? WHERE id = ?")
                .bind(year.to_string())
                .bind(id)
                .execute(pool)
                .await?;
        }
        return Ok(id);
    }

    let release_date = if year != 0 { year.to_string() } else { String::new() };

    let result = sqlx::query(
        "INSERT INTO albums (title, artist_id, release_date, art_file_path) VALUES (?, ?, ?, '')",
    )
    .bind(title)
    .bind(artist_id)
    .bind(release_date)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Attach a persisted artwork path to an album
pub async fn set_album_art(pool: &SqlitePool, album_id: i64, art_path: &str) -> Result<()> {
    sqlx::query("UPDATE albums SET art_file_path = ? WHERE id = ?")
        .bind(art_path)
        .bind(album_id)
        .execute(pool)
        .await?;

    Ok(())
}
