//! Error types for the backup check core library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the backup check library.
///
/// Verdict failures (too old, too small, ...) are not errors; they are
/// reported through [`crate::Verdict`]. This type covers configuration and
/// infrastructure problems only.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file does not exist or cannot be read
    #[error("Could not read config file {path}: {source}")]
    ConfigFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Could not decode config file: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage backend error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Listing did not complete in time
    #[error("Listing timed out after {0:?}")]
    Timeout(Duration),

    /// Client could not be built from the given credentials
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Backend(_) => "backend",
            StorageError::Timeout(_) => "timeout",
            StorageError::InvalidConfig(_) => "invalid_config",
        }
    }
}
