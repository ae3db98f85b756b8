//! Loading and saving the config document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use directories::BaseDirs;
use tracing::{debug, info, warn};

use super::app::AppConfig;
use super::error::ConfigError;

/// Directory under the platform's local data dir holding the config file.
const APP_DIR_NAME: &str = "TramTracker";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.json";

/// Source of the config document.
///
/// `load` never fails: a missing or unreadable document yields defaults,
/// so a broken config file degrades the display instead of stopping it.
pub trait ConfigStore: Send + Sync {
    /// Read the current document.
    fn load(&self) -> AppConfig;

    /// Persist a document.
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn load(&self) -> AppConfig {
        (**self).load()
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        (**self).save(config)
    }
}

/// JSON config file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default location, `<local data dir>/TramTracker/config.json`.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| {
            dirs.data_local_dir()
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME)
        })
    }

    /// The config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. `Ok(None)` means it doesn't exist.
    fn read(&self) -> Result<Option<AppConfig>, ConfigError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(Some(serde_json::from_str(&json)?))
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> AppConfig {
        match self.read() {
            Ok(Some(config)) => {
                debug!(path = ?self.path, "loaded config");
                config.validated()
            }
            Ok(None) => {
                let config = AppConfig::default();
                info!(path = ?self.path, "no config file, writing defaults");
                if let Err(e) = self.save(&config) {
                    warn!("failed to write default config: {e}");
                }
                config
            }
            Err(e) => {
                warn!("using default config: {e}");
                AppConfig::default()
            }
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(config)?;

        std::fs::write(&self.path, json).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Config held in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    config: Mutex<AppConfig>,
}

impl InMemoryStore {
    /// Create a store holding `config`.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    /// Replace the held document, as if the user edited the file.
    pub fn set(&self, config: AppConfig) {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

impl ConfigStore for InMemoryStore {
    fn load(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .validated()
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.set(config.clone());
        Ok(())
    }
}
