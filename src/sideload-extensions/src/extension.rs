//! Extension identities and descriptors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ExtensionError, Result};
use crate::host::HostPaths;
use crate::metadata::ExtensionMetadata;
use crate::version::major_of;

/// Kind of a managed extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    /// A plugin, addressed by its plugins-relative metadata path
    Plugin,
    /// A theme, addressed by its directory slug
    Theme,
}

impl ExtensionKind {
    /// Get the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Theme => "theme",
        }
    }
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-supplied registration: which extension to manage and under
/// what update policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRegistration {
    /// Absolute path to the extension's metadata file
    pub file: PathBuf,

    /// Manifest URL announcing available versions
    pub manifest_url: String,

    /// Only accept updates within the current major version
    #[serde(default)]
    pub restrict_major: bool,

    /// Accept version strings with pre-release/experimental markers
    #[serde(default)]
    pub allow_experimental: bool,
}

/// A fully resolved extension: a registration enriched with the metadata
/// of the installed code. Built at check time, never persisted.
#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    /// Absolute path to the metadata file
    pub file: PathBuf,
    /// Installation directory
    pub dir: PathBuf,
    /// Public id: plugins-relative path for plugins, directory slug for themes
    pub id: String,
    /// Plugin or theme
    pub kind: ExtensionKind,
    /// Human-readable name
    pub name: String,
    /// Installed version
    pub version: String,
    /// Integer prefix of the installed version
    pub major_version: u64,
    /// Manifest URL
    pub manifest_url: String,
    /// Only accept updates within the current major version
    pub restrict_major: bool,
    /// Accept experimental version strings
    pub allow_experimental: bool,
    /// Homepage / details URL from the metadata file
    pub homepage: Option<String>,
}

impl ExtensionDescriptor {
    /// Resolve a registration against the host paths and the installed
    /// metadata file.
    pub fn resolve(registration: &ExtensionRegistration, paths: &HostPaths) -> Result<Self> {
        let file = registration.file.clone();
        let (kind, id) = identify(&file, paths)?;
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let metadata = ExtensionMetadata::from_file(&file)?;
        let major_version = major_of(&metadata.version);

        Ok(Self {
            file,
            dir,
            id,
            kind,
            name: metadata.name,
            version: metadata.version,
            major_version,
            manifest_url: registration.manifest_url.clone(),
            restrict_major: registration.restrict_major,
            allow_experimental: registration.allow_experimental,
            homepage: metadata.homepage,
        })
    }

    /// Normalized key under which this extension appears in persisted state.
    pub fn file_key(&self) -> String {
        file_key(&self.file)
    }
}

/// Normalize a metadata-file path into a persisted map key.
pub fn file_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Classify a metadata-file path as plugin or theme and derive its public id.
fn identify(file: &Path, paths: &HostPaths) -> Result<(ExtensionKind, String)> {
    if let Ok(relative) = file.strip_prefix(&paths.plugins_dir) {
        return Ok((ExtensionKind::Plugin, file_key(relative)));
    }
    if file.strip_prefix(&paths.themes_dir).is_ok() {
        let slug = file
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ExtensionError::OutsideHostPaths {
                path: file.to_path_buf(),
            })?;
        return Ok((ExtensionKind::Theme, slug));
    }
    Err(ExtensionError::OutsideHostPaths {
        path: file.to_path_buf(),
    })
}
