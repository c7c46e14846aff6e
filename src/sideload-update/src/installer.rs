//! Package installation: consume a pending update and swap files in place.
//!
//! Every step before the live directory is touched is a fail-fast gate;
//! once the old files are deleted there is no rollback. A failure during
//! the swap can leave the extension partially updated or deactivated;
//! the operator retries after the next resolver sweep.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sideload_extensions::extension::file_key;
use sideload_extensions::{
    ExtensionKind, ExtensionMetadata, HostIntegration, HostPaths, PluginActivation,
};
use sideload_store::SettingsStore;

use crate::archive;
use crate::client::ManifestClient;
use crate::command::UpdateRequest;
use crate::error::{UpdateError, UpdateResult};
use crate::files;
use crate::hooks::UpdateHooks;
use crate::manifest::VersionCandidate;
use crate::pending::PendingUpdates;
use crate::scratch::Scratch;
use crate::verify::{entity_tag_mismatch, verify_sha256};

/// Final identity of an applied update.
#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    /// Metadata-file path after the swap (may differ for plugins)
    pub file: PathBuf,
    /// Public id after the swap
    pub id: String,
    /// Plugin or theme
    pub kind: ExtensionKind,
    /// Version now installed
    pub version: String,
}

/// The update target as resolved from a request against the pending set.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    /// Pending-set key (normalized metadata-file path)
    pub key: String,
    /// Metadata file
    pub file: PathBuf,
    /// Installation directory
    pub dir: PathBuf,
    /// Public id from the request
    pub id: String,
    /// Plugin or theme
    pub kind: ExtensionKind,
}

/// Applies one pending update to the filesystem.
pub struct Installer {
    client: ManifestClient,
    paths: HostPaths,
    host: Arc<dyn HostIntegration>,
    hooks: Arc<Vec<Arc<dyn UpdateHooks>>>,
}

impl Installer {
    /// Create an installer.
    pub fn new(
        client: ManifestClient,
        paths: HostPaths,
        host: Arc<dyn HostIntegration>,
        hooks: Arc<Vec<Arc<dyn UpdateHooks>>>,
    ) -> Self {
        Self {
            client,
            paths,
            host,
            hooks,
        }
    }

    /// Steps 1–2: resolve the request against the pending set and consume
    /// the entry immediately. A retry past this point re-resolves instead
    /// of reusing stale state.
    pub(crate) fn consume(
        &self,
        request: &UpdateRequest,
        store: &mut dyn SettingsStore,
    ) -> UpdateResult<(Target, VersionCandidate)> {
        let mut pending = PendingUpdates::load(store);
        let target = self
            .resolve_target(request, &pending)
            .ok_or(UpdateError::NoUpdate)?;
        let candidate = pending.take(&target.key).ok_or(UpdateError::NoUpdate)?;
        pending.save(store)?;
        Ok((target, candidate))
    }

    /// Steps 3 onwards: probe, download, verify, unpack, swap.
    pub(crate) async fn install(
        &self,
        target: &Target,
        candidate: &VersionCandidate,
    ) -> UpdateResult<AppliedUpdate> {
        // The remote may announce its own integrity value; disagreement
        // with the manifest hash fails before any download.
        if let Some(tag) = self.client.head_entity_tag(&candidate.url).await? {
            if entity_tag_mismatch(&tag, &candidate.hash) {
                return Err(UpdateError::RemoteChecksumFailed);
            }
        }

        let scratch = Scratch::new()?;
        let package = scratch.package_path(&candidate.version, &candidate.url);
        if let Err(e) = self.client.download(&candidate.url, &package).await {
            let _ = scratch.cleanup();
            return Err(e);
        }

        self.install_package(target, candidate, &scratch, &package)
            .await
    }

    /// Steps 5–17 over an already downloaded package.
    pub(crate) async fn install_package(
        &self,
        target: &Target,
        candidate: &VersionCandidate,
        scratch: &Scratch,
        package: &Path,
    ) -> UpdateResult<AppliedUpdate> {
        // Recompute integrity over the actual downloaded bytes.
        if let Err(e) = verify_sha256(package, &candidate.hash).await {
            let _ = std::fs::remove_file(package);
            return Err(e);
        }

        // Unpack next to the download, into a directory named by the hash.
        let unpack_dir = scratch.extraction_dir(&candidate.hash);
        if let Err(e) = archive::extract_zip(package, &unpack_dir) {
            let _ = std::fs::remove_file(package);
            return Err(e);
        }

        // The archive is no longer needed.
        std::fs::remove_file(package)?;

        // The package must carry its payload in a top-level directory.
        let files_root = archive::find_files_root(&unpack_dir)?;

        for hook in self.hooks.iter() {
            hook.before_update(&target.key, &target.id, target.kind).await;
        }

        // A live plugin is deactivated for the duration of the swap.
        let mut activation = PluginActivation::default();
        if target.kind == ExtensionKind::Plugin {
            activation = self.host.plugin_activation(&target.id).await;
            if activation.active {
                self.host.deactivate_plugin(&target.id, activation.global).await;
            }
        }

        // Point of no return: clear the live directory and copy the new
        // files in.
        files::clear_dir(&target.dir)?;
        files::copy_dir(&files_root, &target.dir)?;

        let _ = scratch.cleanup();

        let (file, id) = match target.kind {
            ExtensionKind::Plugin => {
                let (file, id) = self.rescan_plugin_identity(target);
                self.host.clear_plugin_cache().await;
                if activation.active {
                    self.host.activate_plugin(&id, activation.global).await;
                }
                (file, id)
            }
            ExtensionKind::Theme => {
                self.host.clear_theme_cache().await;
                (target.file.clone(), target.id.clone())
            }
        };

        let key = file_key(&file);
        for hook in self.hooks.iter() {
            hook.after_update(&key, &id, target.kind).await;
        }

        tracing::info!(
            extension = %id,
            version = %candidate.version,
            "Extension updated"
        );

        Ok(AppliedUpdate {
            file,
            id,
            kind: target.kind,
            version: candidate.version.clone(),
        })
    }

    /// The metadata file may have moved or been renamed by the update.
    /// When the recorded file is gone or no longer carries a version,
    /// adopt the first `.toml` file (name order) with valid metadata.
    fn rescan_plugin_identity(&self, target: &Target) -> (PathBuf, String) {
        if has_valid_metadata(&target.file) {
            return (target.file.clone(), target.id.clone());
        }

        if let Some(adopted) = scan_for_metadata(&target.dir) {
            let id = adopted
                .strip_prefix(&self.paths.plugins_dir)
                .map(file_key)
                .unwrap_or_else(|_| file_key(&adopted));
            tracing::debug!(file = %adopted.display(), "Adopted relocated plugin metadata");
            return (adopted, id);
        }

        (target.file.clone(), target.id.clone())
    }

    /// Map a request onto a pending-set key.
    fn resolve_target(&self, request: &UpdateRequest, pending: &PendingUpdates) -> Option<Target> {
        for key in pending.keys() {
            let file = PathBuf::from(key);
            match request {
                UpdateRequest::Plugin(requested) => {
                    if let Ok(relative) = file.strip_prefix(&self.paths.plugins_dir) {
                        if relative == Path::new(requested) {
                            return Some(Target {
                                key: key.clone(),
                                dir: file.parent()?.to_path_buf(),
                                file,
                                id: requested.clone(),
                                kind: ExtensionKind::Plugin,
                            });
                        }
                    }
                }
                UpdateRequest::Theme(slug) => {
                    if file.strip_prefix(&self.paths.themes_dir).is_ok() {
                        let dir = file.parent()?;
                        if dir.file_name().is_some_and(|name| name.to_string_lossy() == *slug) {
                            return Some(Target {
                                key: key.clone(),
                                dir: dir.to_path_buf(),
                                file,
                                id: slug.clone(),
                                kind: ExtensionKind::Theme,
                            });
                        }
                    }
                }
            }
        }
        None
    }
}

fn has_valid_metadata(path: &Path) -> bool {
    path.is_file() && ExtensionMetadata::from_file(path).is_ok()
}

/// First `.toml` file in name order carrying valid metadata.
fn scan_for_metadata(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "toml")
        })
        .collect();
    candidates.sort();
    candidates.into_iter().find(|path| has_valid_metadata(path))
}
