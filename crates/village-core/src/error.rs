//! Error types for the data model.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while decoding records.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),

    #[error("metadata is empty")]
    EmptyMetadata,

    #[error("metadata is not a JSON object")]
    NotAnObject,

    #[error("invalid numeric field `{field}`: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Errors raised while loading or writing the project configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(path: &Path, source: serde_json::Error) -> Self {
        ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        }
    }
}
