//! Tag extraction from audio files
//!
//! The synchronization engine reads tags through the [`TagReader`]
//! capability trait; [`LoftyTagReader`] is the production adapter over
//! lofty's format probing. Absent optional fields come back as empty
//! strings or zero rather than failing the extraction.

use lofty::error::{ErrorKind, LoftyError};
use lofty::file::{FileType, TaggedFileExt};
use lofty::picture::MimeType;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tag extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Container format not recognized by the tag parser
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Recognized container that fails to parse
    #[error("Corrupt file {0}: {1}")]
    CorruptFile(PathBuf, String),

    /// I/O error (file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedded artwork pulled out of a tag
#[derive(Debug, Clone)]
pub struct Artwork {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// File extension for the image format, without the dot
    pub ext: String,
}

/// Tags read from one audio file
#[derive(Debug, Clone, Default)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Release year; zero when the tag is absent
    pub year: u32,
    /// Track number; zero when the tag is absent
    pub track_number: u32,
    /// Detected container format ("MP3", "FLAC")
    pub format: String,
    pub artwork: Option<Artwork>,
}

/// Capability seam between the synchronization engine and the tag
/// parsing backend
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<TrackTags, MetadataError>;
}

/// lofty-backed reader for MP3 and FLAC containers
#[derive(Debug, Clone, Default)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags, MetadataError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| classify(path, e))?
            .read()
            .map_err(|e| classify(path, e))?;

        let format = match tagged_file.file_type() {
            FileType::Mpeg => "MP3".to_string(),
            FileType::Flac => "FLAC".to_string(),
            _ => return Err(MetadataError::UnsupportedFormat(path.to_path_buf())),
        };

        let mut tags = TrackTags {
            format,
            ..TrackTags::default()
        };

        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            tags.title = tag.title().map(|s| s.to_string()).unwrap_or_default();
            tags.artist = tag.artist().map(|s| s.to_string()).unwrap_or_default();
            tags.album = tag.album().map(|s| s.to_string()).unwrap_or_default();
            tags.genre = tag.genre().map(|s| s.to_string()).unwrap_or_default();
            tags.year = tag.year().unwrap_or(0);
            tags.track_number = tag.track().unwrap_or(0);

            tags.artwork = tag
                .pictures()
                .first()
                .filter(|pic| !pic.data().is_empty())
                .map(|pic| Artwork {
                    data: pic.data().to_vec(),
                    ext: mime_extension(pic.mime_type()).to_string(),
                });
        }

        tracing::debug!(
            file = %path.display(),
            artist = %tags.artist,
            title = %tags.title,
            format = %tags.format,
            "Extracted tags"
        );

        Ok(tags)
    }
}

fn classify(path: &Path, err: LoftyError) -> MetadataError {
    match err.kind() {
        ErrorKind::UnknownFormat => MetadataError::UnsupportedFormat(path.to_path_buf()),
        ErrorKind::Io(io) => MetadataError::Io(std::io::Error::new(io.kind(), io.to_string())),
        _ => MetadataError::CorruptFile(path.to_path_buf(), err.to_string()),
    }
}

/// File extension for an embedded picture's MIME type. Front covers
/// are overwhelmingly JPEG; unknown types land there too.
fn mime_extension(mime: Option<&MimeType>) -> &'static str {
    match mime {
        Some(MimeType::Png) => "png",
        Some(MimeType::Gif) => "gif",
        Some(MimeType::Bmp) => "bmp",
        Some(MimeType::Tiff) => "tif",
        _ => "jpg",
    }
}
