//! Config store error types.

use std::path::PathBuf;

/// Errors from reading or writing the config document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for an `AppConfig`
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
