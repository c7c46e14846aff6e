//! Error types for sideload-update.

use thiserror::Error;

/// Result type for update operations.
pub type UpdateResult<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while resolving or applying updates.
#[derive(Debug, Error)]
pub enum UpdateError {
    // Pending set
    #[error("No update defined for extension")]
    NoUpdate,

    // Integrity
    #[error("Remote file could not be verified")]
    RemoteChecksumFailed,

    #[error("Downloaded file could not be verified: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // Package layout
    #[error("Extension update lacks a files directory")]
    NoFilesDirectory,

    // Network
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned error {status} for {url}")]
    ServerError { status: u16, url: String },

    // Manifest
    #[error("Invalid manifest url \"{url}\"")]
    InvalidManifestUrl { url: String },

    #[error("Invalid manifest format {url}")]
    InvalidManifest { url: String },

    // Archive
    #[error("Failed to extract archive: {message}")]
    ExtractionFailed { message: String },

    // Lower layers
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] sideload_store::StoreError),

    #[error(transparent)]
    Extension(#[from] sideload_extensions::ExtensionError),
}

impl UpdateError {
    /// Stable machine-readable code carried by the command envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoUpdate => "no_update",
            Self::RemoteChecksumFailed | Self::ChecksumMismatch { .. } => "checksum_failed",
            Self::NoFilesDirectory => "no_filesystem",
            Self::Network(_) | Self::ServerError { .. } => "http_request_failed",
            Self::InvalidManifestUrl { .. } | Self::InvalidManifest { .. } => "bad_manifest",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Store(_) => "store_error",
            Self::Extension(_) => "bad_metadata",
        }
    }
}
