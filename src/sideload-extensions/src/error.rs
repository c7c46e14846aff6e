//! Extension model error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for extension operations.
pub type Result<T> = std::result::Result<T, ExtensionError>;

/// Errors raised while resolving extension registrations.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Metadata file could not be read.
    #[error("Failed to read metadata file {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Metadata file is not valid TOML or lacks the `[extension]` table.
    #[error("Invalid metadata in {path}: {message}")]
    InvalidMetadata { path: PathBuf, message: String },

    /// Registered file sits outside both host extension roots.
    #[error("{path} is neither under the plugins nor the themes directory")]
    OutsideHostPaths { path: PathBuf },
}

impl ExtensionError {
    /// Create an invalid-metadata error.
    pub fn invalid_metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            path: path.into(),
            message: message.into(),
        }
    }
}
