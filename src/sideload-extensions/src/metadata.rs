//! Extension metadata files.
//!
//! Every managed extension carries a TOML metadata file inside its
//! installation directory (`plugin.toml` for plugins, `theme.toml` for
//! themes by convention) with an `[extension]` table describing the
//! installed code. Any `.toml` file carrying a valid `[extension]` table
//! is recognized; the updater relies on that looseness when it re-scans a
//! freshly replaced plugin whose metadata file moved.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExtensionError, Result};

/// Metadata describing an installed extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    /// Human-readable extension name
    pub name: String,

    /// Installed version string
    pub version: String,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Homepage / details URL
    #[serde(default)]
    pub homepage: Option<String>,
}

/// On-disk document shape: the metadata lives under `[extension]`.
#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    extension: ExtensionMetadata,
}

impl ExtensionMetadata {
    /// Load and validate metadata from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            ExtensionError::MetadataRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(path, &content)
    }

    /// Parse and validate metadata from a TOML string.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let file: MetadataFile = toml::from_str(content)
            .map_err(|e| ExtensionError::invalid_metadata(path, e.to_string()))?;
        file.extension.validate(path)?;
        Ok(file.extension)
    }

    /// Validate the metadata.
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ExtensionError::invalid_metadata(path, "name cannot be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(ExtensionError::invalid_metadata(
                path,
                "version cannot be empty",
            ));
        }
        Ok(())
    }
}
