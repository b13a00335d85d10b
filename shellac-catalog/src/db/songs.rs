//! Song catalog operations
//!
//! Songs are the only entity deleted directly; artists, albums and
//! genres are only ever removed by the orphan sweep that follows a
//! song deletion.

use shellac_common::db::models::SongDetail;
use shellac_common::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

/// Field set for a song upsert, gathered from one scanned file
#[derive(Debug, Clone)]
pub struct SongRecord {
    pub title: String,
    pub artist_id: i64,
    pub album_id: i64,
    pub genre_id: i64,
    pub track_number: u32,
    pub file_path: String,
    pub file_format: String,
}

/// Insert the song if absent, otherwise update it in place and return
/// the existing row id
///
/// Songs are keyed by (title, album, artist). On a hit every mutable
/// field is refreshed from the scanned file, except that a zero track
/// number means the tag was absent and the stored value is kept.
pub async fn upsert_song(pool: &SqlitePool, song: &SongRecord) -> Result<i64> {
    let existing: Option<(i64, i64)> = sqlx::query_as(
        "SELECT id, track_number FROM songs WHERE title = ? AND album_id = ? AND artist_id = ?",
    )
    .bind(&song.title)
    .bind(song.album_id)
    .bind(song.artist_id)
    .fetch_optional(pool)
    .await?;

    if let Some((id, stored_track)) = existing {
        debug!("Song \"{}\" already cataloged, updating", song.title);

        let track_number = if song.track_number == 0 {
            stored_track
        } else {
            i64::from(song.track_number)
        };

        sqlx::query(
            r#"
            UPDATE songs
            SET artist_id = ?,
                genre_id = ?,
                album_id = ?,
                track_number = ?,
                file_path = ?,
                file_format = ?
            WHERE id = ?
            "#,
        )
        .bind(song.artist_id)
        .bind(song.genre_id)
        .bind(song.album_id)
        .bind(track_number)
        .bind(&song.file_path)
        .bind(&song.file_format)
        .bind(id)
        .execute(pool)
        .await?;

        return Ok(id);
    }

    // A re-tagged file no longer matches its old natural key but still
    // occupies its path. The old row is the same file, so it is
    // rewritten in place rather than duplicated.
    let superseded: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE file_path = ?")
        .bind(&song.file_path)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = superseded {
        debug!(
            "File {} was re-tagged, rewriting its catalog entry",
            song.file_path
        );

        sqlx::query(
            r#"
            UPDATE songs
            SET title = ?,
                artist_id = ?,
                genre_id = ?,
                album_id = ?,
                track_number = ?,
                file_format = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.title)
        .bind(song.artist_id)
        .bind(song.genre_id)
        .bind(song.album_id)
        .bind(i64::from(song.track_number))
        .bind(&song.file_format)
        .bind(id)
        .execute(pool)
        .await?;

        return Ok(id);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO songs (title, album_id, artist_id, genre_id, track_number, file_path, file_format)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&song.title)
    .bind(song.album_id)
    .bind(song.artist_id)
    .bind(song.genre_id)
    .bind(i64::from(song.track_number))
    .bind(&song.file_path)
    .bind(&song.file_format)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All stored (id, file_path) pairs, for deleted-file reconciliation
pub async fn list_song_paths(pool: &SqlitePool) -> Result<Vec<(i64, String)>> {
    let paths = sqlx::query_as("SELECT id, file_path FROM songs")
        .fetch_all(pool)
        .await?;

    Ok(paths)
}

/// Delete songs by id in one batch, then sweep orphaned referents
///
/// Runs in a single transaction: a half-applied deletion would leave
/// the catalog with rows the sweep should have removed.
pub async fn delete_songs(pool: &SqlitePool, ids: &[i64]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM songs WHERE id IN ({placeholders})");
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }
    query.execute(&mut *tx).await?;

    sweep_orphans(&mut tx).await?;

    tx.commit().await?;

    Ok(())
}

/// Delete a single song and sweep its referents if orphaned
pub async fn delete_song(pool: &SqlitePool, id: i64) -> Result<()> {
    delete_songs(pool, &[id]).await
}

/// Remove artists, albums and genres left without any referencing song
///
/// Albums go first: an artist referenced only by a dead album becomes
/// sweepable once that album is gone (albums carry an artist foreign
/// key). Runs only after song deletion, never after upserts.
async fn sweep_orphans(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM albums
        WHERE id NOT IN (SELECT DISTINCT album_id FROM songs)
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM artists
        WHERE id NOT IN (SELECT DISTINCT artist_id FROM songs)
          AND id NOT IN (SELECT DISTINCT artist_id FROM albums)
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM genres
        WHERE id NOT IN (SELECT DISTINCT genre_id FROM songs)
        "#,
    )
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Every cataloged song with its artist, album and genre names resolved
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<SongDetail>> {
    let songs = sqlx::query_as::<_, SongDetail>(
        r#"
        SELECT
            s.id,
            s.title,
            a.name AS artist,
            al.title AS album,
            g.name AS genre,
            s.track_number,
            s.file_path,
            s.file_format
        FROM songs s
        INNER JOIN artists a ON s.artist_id = a.id
        INNER JOIN albums al ON s.album_id = al.id
        INNER JOIN genres g ON s.genre_id = g.id
        ORDER BY a.name, al.title, s.track_number
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::albums::upsert_album;
    use crate::db::artists::upsert_artist;
    use crate::db::genres::upsert_genre;
    use crate::db::test_support::memory_pool;

    async fn seed_song(pool: &SqlitePool, title: &str, artist: &str, album: &str, genre: &str) -> i64 {
        let artist_id = upsert_artist(pool, artist).await.expect("artist");
        let album_id = upsert_album(pool, album, artist_id, 0).await.expect("album");
        let genre_id = upsert_genre(pool, genre).await.expect("genre");

        upsert_song(
            pool,
            &SongRecord {
                title: title.to_string(),
                artist_id,
                album_id,
                genre_id,
                track_number: 1,
                file_path: format!("/music/{title}.mp3"),
                file_format: "MP3".to_string(),
            },
        )
        .await
        .expect("song")
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let pool = memory_pool().await;
        let id = seed_song(&pool, "Oxygene", "Jarre", "Oxygene", "Electronic").await;

        let artist_id = upsert_artist(&pool, "Jarre").await.expect("artist");
        let album_id = upsert_album(&pool, "Oxygene", artist_id, 1976).await.expect("album");
        let genre_id = upsert_genre(&pool, "Ambient").await.expect("genre");

        let again = upsert_song(
            &pool,
            &SongRecord {
                title: "Oxygene".to_string(),
                artist_id,
                album_id,
                genre_id,
                track_number: 4,
                file_path: "/music/oxygene-part-4.mp3".to_string(),
                file_format: "MP3".to_string(),
            },
        )
        .await
        .expect("re-upsert");

        assert_eq!(id, again);

        let (track, path): (i64, String) =
            sqlx::query_as("SELECT track_number, file_path FROM songs WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .expect("row");

        assert_eq!(track, 4);
        assert_eq!(path, "/music/oxygene-part-4.mp3");
    }

    #[tokio::test]
    async fn test_zero_track_number_keeps_stored_value() {
        let pool = memory_pool().await;
        let id = seed_song(&pool, "Oxygene", "Jarre", "Oxygene", "Electronic").await;

        let artist_id = upsert_artist(&pool, "Jarre").await.expect("artist");
        let album_id = upsert_album(&pool, "Oxygene", artist_id, 0).await.expect("album");
        let genre_id = upsert_genre(&pool, "Electronic").await.expect("genre");

        upsert_song(
            &pool,
            &SongRecord {
                title: "Oxygene".to_string(),
                artist_id,
                album_id,
                genre_id,
                track_number: 0,
                file_path: "/music/Oxygene.mp3".to_string(),
                file_format: "MP3".to_string(),
            },
        )
        .await
        .expect("re-upsert");

        let track: i64 = sqlx::query_scalar("SELECT track_number FROM songs WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("track");

        assert_eq!(track, 1);
    }

    #[tokio::test]
    async fn test_retagged_file_rewrites_its_row() {
        let pool = memory_pool().await;
        let id = seed_song(&pool, "Oxygene", "Jarre", "Oxygene", "Electronic").await;

        // Same path, entirely new identity
        let artist_id = upsert_artist(&pool, "Jean-Michel Jarre").await.expect("artist");
        let album_id = upsert_album(&pool, "Equinoxe", artist_id, 1978).await.expect("album");
        let genre_id = upsert_genre(&pool, "Electronic").await.expect("genre");

        let rewritten = upsert_song(
            &pool,
            &SongRecord {
                title: "Equinoxe Part 5".to_string(),
                artist_id,
                album_id,
                genre_id,
                track_number: 5,
                file_path: "/music/Oxygene.mp3".to_string(),
                file_format: "MP3".to_string(),
            },
        )
        .await
        .expect("retag upsert");

        assert_eq!(rewritten, id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);

        let title: String = sqlx::query_scalar("SELECT title FROM songs WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("title");
        assert_eq!(title, "Equinoxe Part 5");
    }

    #[tokio::test]
    async fn test_delete_sweeps_orphans_but_keeps_shared_rows() {
        let pool = memory_pool().await;
        let kept = seed_song(&pool, "Phaedra", "Tangerine Dream", "Phaedra", "Berlin School").await;
        let doomed = seed_song(&pool, "Rubycon", "Tangerine Dream", "Rubycon", "Ambient").await;

        delete_song(&pool, doomed).await.expect("delete");

        let artists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists").fetch_one(&pool).await.expect("artists");
        let albums: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums").fetch_one(&pool).await.expect("albums");
        let genres: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres").fetch_one(&pool).await.expect("genres");
        let songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs").fetch_one(&pool).await.expect("songs");

        // Shared artist survives; the dead song's album and genre do not
        assert_eq!(artists, 1);
        assert_eq!(albums, 1);
        assert_eq!(genres, 1);
        assert_eq!(songs, 1);

        let remaining: i64 = sqlx::query_scalar("SELECT id FROM songs").fetch_one(&pool).await.expect("song id");
        assert_eq!(remaining, kept);
    }

    #[tokio::test]
    async fn test_delete_songs_with_empty_batch_is_a_noop() {
        let pool = memory_pool().await;
        seed_song(&pool, "Phaedra", "Tangerine Dream", "Phaedra", "Berlin School").await;

        delete_songs(&pool, &[]).await.expect("empty batch");

        let songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs").fetch_one(&pool).await.expect("songs");
        assert_eq!(songs, 1);
    }

    #[tokio::test]
    async fn test_list_songs_resolves_names() {
        let pool = memory_pool().await;
        seed_song(&pool, "Phaedra", "Tangerine Dream", "Phaedra", "Berlin School").await;

        let songs = list_songs(&pool).await.expect("list");

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Phaedra");
        assert_eq!(songs[0].artist, "Tangerine Dream");
        assert_eq!(songs[0].album, "Phaedra");
        assert_eq!(songs[0].genre, "Berlin School");
    }
}
