//! Catalog row models

use serde::Serialize;
use sqlx::FromRow;

/// Artist row, keyed naturally by name
#[derive(Debug, Clone, FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub art_file_path: Option<String>,
}

/// Album row, keyed naturally by (title, artist)
#[derive(Debug, Clone, FromRow)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub release_date: String,
    pub art_file_path: String,
}

/// Genre row, keyed naturally by name
#[derive(Debug, Clone, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Song row; `file_path` identifies the on-disk source
#[derive(Debug, Clone, FromRow)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub album_id: i64,
    pub genre_id: i64,
    pub track_number: i64,
    pub file_path: String,
    pub file_format: String,
}

/// Song joined with the names of its referenced entities, as served by
/// the read API
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SongDetail {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub track_number: i64,
    pub file_path: String,
    pub file_format: String,
}
