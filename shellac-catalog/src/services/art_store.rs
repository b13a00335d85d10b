//! Album artwork persistence
//!
//! Embedded artwork is written once to a deterministic per-album path
//! under the storage root. A second sighting of art for the same album
//! returns the existing path without rewriting it.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

const ALBUM_ART_DIR: &str = "album-art";

/// Artwork storage rooted at a fixed directory
#[derive(Debug, Clone)]
pub struct ArtStore {
    storage_root: PathBuf,
}

impl ArtStore {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// Path where art for the given album lives, written or not
    pub fn album_art_path(&self, album_id: i64, ext: &str) -> PathBuf {
        self.storage_root
            .join(ALBUM_ART_DIR)
            .join(format!("album-art-{album_id}.{ext}"))
    }

    /// Persist embedded artwork for an album
    ///
    /// Creates the storage directory on first use. When the target file
    /// already exists the write is skipped and the existing path is
    /// returned; the bytes are not re-validated against it.
    pub fn save_album_art(&self, data: &[u8], ext: &str, album_id: i64) -> io::Result<PathBuf> {
        let dir = self.storage_root.join(ALBUM_ART_DIR);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("album-art-{album_id}.{ext}"));
        if path.exists() {
            debug!("Album art already exists: {}", path.display());
            return Ok(path);
        }

        fs::write(&path, data)?;
        debug!("Saved album art: {}", path.display());

        Ok(path)
    }
}
