//! Configuration Storage
//!
//! Reads the defaults file from disk.
//! Location: ~/.mediaferry/config.json on macOS/Linux, %APPDATA%\mediaferry on Windows

use std::path::{Path, PathBuf};

use tokio::fs;

use super::types::{ConfigFile, CONFIG_VERSION};

/// Configuration storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config version {found} is newer than supported {supported}")]
    VersionTooNew { found: u32, supported: u32 },
}

/// Get the mediaferry configuration directory
pub fn config_dir() -> Result<PathBuf, StorageError> {
    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join("mediaferry"));
        }
        dirs::home_dir()
            .map(|home| home.join(".mediaferry"))
            .ok_or(StorageError::NoConfigDir)
    }

    #[cfg(not(windows))]
    {
        dirs::home_dir()
            .map(|home| home.join(".mediaferry"))
            .ok_or(StorageError::NoConfigDir)
    }
}

/// Get the defaults file path
pub fn config_file() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join("config.json"))
}

/// Defaults file reader
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Storage reading the file at `path`
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the defaults file.
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<ConfigFile, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", self.path.display());
                return Ok(ConfigFile::default());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let config: ConfigFile =
            serde_json::from_str(&contents).map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })?;

        if config.version > CONFIG_VERSION {
            return Err(StorageError::VersionTooNew {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        tracing::debug!("Loaded config from {}", self.path.display());
        Ok(config)
    }
}

/// Load the defaults file at `explicit` (`--config`) or else at
/// `default_location`. Without `--config`, a missing config directory falls
/// back to built-in defaults.
pub async fn load_defaults(
    explicit: Option<&Path>,
    default_location: Result<PathBuf, StorageError>,
) -> Result<ConfigFile, StorageError> {
    let path = match (explicit, default_location) {
        (Some(path), _) => path.to_path_buf(),
        (None, Ok(path)) => path,
        (None, Err(StorageError::NoConfigDir)) => {
            tracing::warn!("No config directory available, using built-in defaults");
            return Ok(ConfigFile::default());
        }
        (None, Err(e)) => return Err(e),
    };

    ConfigStorage::with_path(path).load().await
}
