//! Service configuration
//!
//! Loaded once at startup from a TOML file. Only `library_root` is
//! required; everything else has a sensible default. A missing or
//! unparseable file is fatal at process start.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loaded from the TOML file
///
/// These settings cannot change during runtime; the service must
/// restart to pick up changes.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory of the audio library to catalog
    ///
    /// May start with `~`, which is expanded when the synchronization
    /// pass runs.
    pub library_root: PathBuf,

    /// Path to the SQLite catalog database (created if absent)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Root directory for persisted album artwork
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// HTTP bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("shellac.db")
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        Ok(config)
    }
}

/// Expand a leading `~` to the user's home directory
///
/// Paths without the shorthand are returned unchanged. Failing to
/// resolve the home directory is a configuration error.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("Cannot resolve home directory for '~' path".to_string()))?;

    Ok(home.join(rest))
}
