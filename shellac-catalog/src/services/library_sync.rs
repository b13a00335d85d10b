//! Library synchronization engine
//!
//! One pass reconciles the catalog with the filesystem. Songs whose
//! files vanished since the last pass are purged first, together with
//! any artists, albums and genres that lose their last referencing
//! song. The library tree is then walked and every accepted audio
//! file's tags are upserted by natural key, so an unchanged tree
//! re-synchronizes as a row-level no-op.
//!
//! Failure policy: an unresolvable root or a failed deletion batch
//! aborts the pass; everything that goes wrong with a single file is
//! logged and skipped.

use anyhow::Context;
use shellac_common::config::expand_home;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db::{albums, artists, genres, songs};
use crate::services::art_store::ArtStore;
use crate::services::metadata::TagReader;

/// Extensions accepted by the walk; everything else is ignored
const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "flac"];

/// Fatal synchronization errors. Per-file trouble never surfaces here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Library root could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Library root missing or not a directory
    #[error("Library root not accessible: {0}")]
    RootNotAccessible(PathBuf),

    /// Stale-song deletion or orphan sweep failed; the catalog may
    /// still hold rows for vanished files until the next pass
    #[error("Catalog reconciliation failed: {0}")]
    Reconciliation(#[source] shellac_common::Error),
}

/// One synchronization pass over a library tree
pub struct LibrarySync<R: TagReader> {
    pool: SqlitePool,
    reader: R,
    art_store: ArtStore,
}

impl<R: TagReader> LibrarySync<R> {
    pub fn new(pool: SqlitePool, reader: R, art_store: ArtStore) -> Self {
        Self {
            pool,
            reader,
            art_store,
        }
    }

    /// Run a full pass: deleted-file reconciliation, then the walk
    ///
    /// Returns the number of audio files cataloged. Files that fail
    /// extraction or persistence are logged and excluded from the
    /// count; they do not abort the pass.
    pub async fn synchronize(&self, root: &Path) -> Result<usize, SyncError> {
        let root = expand_home(root).map_err(|e| SyncError::Config(e.to_string()))?;

        info!("Beginning library synchronization: {}", root.display());

        self.reconcile_deleted_files().await?;

        if !root.is_dir() {
            return Err(SyncError::RootNotAccessible(root));
        }

        let mut processed = 0usize;

        for entry in WalkDir::new(&root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !is_allowed_audio_file(path) {
                continue;
            }

            match self.process_file(path).await {
                Ok(()) => {
                    processed += 1;
                    info!("Cataloged {}", path.display());
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        info!(
            "Library synchronization complete: {} files processed",
            processed
        );

        Ok(processed)
    }

    /// Purge songs whose files no longer resolve on disk, then sweep
    /// entities left without a referencing song
    ///
    /// Runs to completion before the walk begins: a file deleted and
    /// recreated between passes is cataloged as new.
    async fn reconcile_deleted_files(&self) -> Result<(), SyncError> {
        let stored = songs::list_song_paths(&self.pool)
            .await
            .map_err(SyncError::Reconciliation)?;

        let stale: Vec<i64> = stored
            .into_iter()
            .filter(|(_, path)| file_is_gone(Path::new(path)))
            .map(|(id, _)| id)
            .collect();

        if stale.is_empty() {
            info!("No deleted files to reconcile");
            return Ok(());
        }

        info!("Removing {} songs whose files are gone", stale.len());

        songs::delete_songs(&self.pool, &stale)
            .await
            .map_err(SyncError::Reconciliation)
    }

    /// Catalog one audio file. Any failure abandons this file only.
    async fn process_file(&self, path: &Path) -> anyhow::Result<()> {
        let tags = self.reader.read_tags(path).context("tag extraction")?;

        let artist_id = artists::upsert_artist(&self.pool, &tags.artist)
            .await
            .context("artist upsert")?;

        let album_id = albums::upsert_album(&self.pool, &tags.album, artist_id, tags.year)
            .await
            .context("album upsert")?;

        if let Some(art) = &tags.artwork {
            let art_path = self
                .art_store
                .save_album_art(&art.data, &art.ext, album_id)
                .context("artwork write")?;
            albums::set_album_art(&self.pool, album_id, &art_path.to_string_lossy())
                .await
                .context("album art update")?;
        }

        let genre_id = genres::upsert_genre(&self.pool, &tags.genre)
            .await
            .context("genre upsert")?;

        let song = songs::SongRecord {
            title: tags.title,
            artist_id,
            album_id,
            genre_id,
            track_number: tags.track_number,
            file_path: path.to_string_lossy().into_owned(),
            file_format: tags.format,
        };

        songs::upsert_song(&self.pool, &song)
            .await
            .context("song upsert")?;

        Ok(())
    }
}

/// A stored path counts as gone only when the file is definitely
/// absent; a transient stat failure must not purge the song.
fn file_is_gone(path: &Path) -> bool {
    matches!(
        std::fs::metadata(path),
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound
    )
}

fn is_allowed_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
