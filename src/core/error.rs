use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid extension name: {0} (must be a SQL identifier: letters, digits, underscores)")]
    InvalidExtensionName(String),

    #[error("Failed to load extension '{name}' from {}: {source}", .path.display())]
    LoadFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Extension '{name}' reports version {found}, which does not satisfy {required}")]
    VersionMismatch {
        name: String,
        found: String,
        required: String,
    },

    #[error("Invalid version: {0} (must be valid semver: e.g., 1.0.0)")]
    InvalidVersion(String),

    #[error("Invalid version requirement: {0}")]
    InvalidVersionRequirement(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExtError>;
