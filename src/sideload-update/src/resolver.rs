//! Manifest resolution: select the best candidate version per extension.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use sideload_extensions::version::{compare_versions, is_plain_version, major_of};
use sideload_extensions::{ExtensionDescriptor, HostEnvironment};
use sideload_store::SettingsStore;

use crate::client::ManifestClient;
use crate::error::UpdateResult;
use crate::hooks::UpdateHooks;
use crate::manifest::{Manifest, VersionCandidate};
use crate::pending::{LAST_CHECKED_KEY, PendingUpdates, UPDATES_KEY};

/// Resolves manifests into the pending-updates set.
///
/// Resolution is best-effort: an extension whose manifest cannot be
/// fetched or parsed is skipped with a log record so one broken manifest
/// never blocks checking the others.
pub struct Resolver {
    client: ManifestClient,
    env: HostEnvironment,
    hooks: Arc<Vec<Arc<dyn UpdateHooks>>>,
}

impl Resolver {
    /// Create a resolver.
    pub fn new(
        client: ManifestClient,
        env: HostEnvironment,
        hooks: Arc<Vec<Arc<dyn UpdateHooks>>>,
    ) -> Self {
        Self { client, env, hooks }
    }

    /// One full sweep: resolve every extension and overwrite the stored
    /// pending set with exactly the extensions that currently qualify.
    /// Returns the number of pending updates.
    pub async fn check_all(
        &self,
        extensions: &[ExtensionDescriptor],
        store: &mut dyn SettingsStore,
    ) -> UpdateResult<usize> {
        let mut updates: BTreeMap<String, VersionCandidate> = BTreeMap::new();

        for extension in extensions {
            if let Some(candidate) = self.resolve(extension).await {
                tracing::debug!(
                    extension = %extension.id,
                    version = %candidate.version,
                    "Update available"
                );
                updates.insert(extension.file_key(), candidate);
            }
        }

        let pending = PendingUpdates::from_map(updates);
        let count = pending.len();

        store.set(UPDATES_KEY, serde_json::to_value(&pending)?);
        store.set(
            LAST_CHECKED_KEY,
            serde_json::Value::String(Utc::now().to_rfc3339()),
        );
        store.flush()?;

        Ok(count)
    }

    /// Resolve one extension to its best candidate, best-effort.
    pub async fn resolve(&self, extension: &ExtensionDescriptor) -> Option<VersionCandidate> {
        let manifest = match self.client.fetch_manifest(&extension.manifest_url).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(
                    extension = %extension.id,
                    url = %extension.manifest_url,
                    error = %e,
                    "Manifest unavailable"
                );
                return None;
            }
        };

        self.select(extension, &manifest).await
    }

    /// Apply the filter chain to a manifest and pick the maximum surviving
    /// candidate. Ties between equal versions resolve to the later
    /// manifest entry (stable sort, last element wins).
    pub async fn select(
        &self,
        extension: &ExtensionDescriptor,
        manifest: &Manifest,
    ) -> Option<VersionCandidate> {
        let mut survivors: Vec<&VersionCandidate> = Vec::new();

        'candidates: for candidate in &manifest.versions {
            if !self.passes_filters(extension, candidate) {
                continue;
            }
            for hook in self.hooks.iter() {
                if !hook.validate_candidate(extension, candidate, manifest).await {
                    continue 'candidates;
                }
            }
            survivors.push(candidate);
        }

        survivors.sort_by(|a, b| compare_versions(&a.version, &b.version));
        survivors.last().map(|candidate| (*candidate).clone())
    }

    /// The ordered filter chain, hooks excepted.
    fn passes_filters(&self, extension: &ExtensionDescriptor, candidate: &VersionCandidate) -> bool {
        // greater version required
        if compare_versions(&candidate.version, &extension.version) != Ordering::Greater {
            return false;
        }

        // restricted major version
        if extension.restrict_major && major_of(&candidate.version) != extension.major_version {
            return false;
        }

        // experimental version markers
        if !extension.allow_experimental && !is_plain_version(&candidate.version) {
            return false;
        }

        // host application bounds
        if !within_bounds(
            &self.env.app_version,
            candidate.min_app.as_deref(),
            candidate.max_app.as_deref(),
        ) {
            return false;
        }

        // host runtime bounds
        if !within_bounds(
            &self.env.runtime_version,
            candidate.min_runtime.as_deref(),
            candidate.max_runtime.as_deref(),
        ) {
            return false;
        }

        // installed extension version bounds
        if !within_bounds(
            &extension.version,
            candidate.min_version.as_deref(),
            candidate.max_version.as_deref(),
        ) {
            return false;
        }

        true
    }
}

/// `min <= current < max`, either bound optional.
fn within_bounds(current: &str, min: Option<&str>, max: Option<&str>) -> bool {
    if let Some(min) = min {
        if compare_versions(min, current) == Ordering::Greater {
            return false;
        }
    }
    if let Some(max) = max {
        if compare_versions(max, current) != Ordering::Greater {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::candidate;
    use async_trait::async_trait;
    use sideload_extensions::{ExtensionKind, HostPaths};
    use std::path::PathBuf;

    fn extension(version: &str, restrict_major: bool, allow_experimental: bool) -> ExtensionDescriptor {
        ExtensionDescriptor {
            file: PathBuf::from("/srv/app/plugins/analytics/plugin.toml"),
            dir: PathBuf::from("/srv/app/plugins/analytics"),
            id: "analytics/plugin.toml".to_string(),
            kind: ExtensionKind::Plugin,
            name: "Analytics".to_string(),
            version: version.to_string(),
            major_version: major_of(version),
            manifest_url: "https://example.com/manifest.json".to_string(),
            restrict_major,
            allow_experimental,
            homepage: None,
        }
    }

    fn env() -> HostEnvironment {
        HostEnvironment::new(
            "6.2",
            "1.85",
            HostPaths::new("/srv/app/plugins", "/srv/app/themes"),
        )
    }

    fn resolver() -> Resolver {
        Resolver::new(ManifestClient::new(), env(), Arc::new(Vec::new()))
    }

    fn manifest_of(versions: &[&str]) -> Manifest {
        Manifest {
            versions: versions
                .iter()
                .map(|v| candidate(v, "https://example.com/pkg.zip", "aa"))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_selects_maximum_qualifying_version() {
        let selected = resolver()
            .select(&extension("2.3", true, false), &manifest_of(&["2.4", "3.0-beta", "2.2"]))
            .await
            .unwrap();
        assert_eq!(selected.version, "2.4");
    }

    #[tokio::test]
    async fn test_no_candidates_means_no_update() {
        let result = resolver()
            .select(&extension("2.3", false, false), &manifest_of(&["2.3", "2.2"]))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_experimental_rejected_unless_allowed() {
        let rejected = resolver()
            .select(&extension("2.3", false, false), &manifest_of(&["3.0-beta"]))
            .await;
        assert!(rejected.is_none());

        let allowed = resolver()
            .select(&extension("2.3", false, true), &manifest_of(&["3.0-beta"]))
            .await
            .unwrap();
        assert_eq!(allowed.version, "3.0-beta");
    }

    #[tokio::test]
    async fn test_major_restriction_rejects_newer_major() {
        let restricted = resolver()
            .select(&extension("2.3", true, false), &manifest_of(&["3.1"]))
            .await;
        assert!(restricted.is_none());

        let unrestricted = resolver()
            .select(&extension("2.3", false, false), &manifest_of(&["3.1"]))
            .await
            .unwrap();
        assert_eq!(unrestricted.version, "3.1");
    }

    #[tokio::test]
    async fn test_equal_versions_tie_breaks_to_later_entry() {
        let manifest = Manifest {
            versions: vec![
                candidate("2.4", "https://example.com/first.zip", "aa"),
                candidate("2.4", "https://example.com/second.zip", "bb"),
            ],
        };

        let selected = resolver()
            .select(&extension("2.3", false, false), &manifest)
            .await
            .unwrap();
        assert_eq!(selected.url, "https://example.com/second.zip");
    }

    #[tokio::test]
    async fn test_host_bounds() {
        // env app version is 6.2
        let mut too_new = candidate("2.4", "u", "h");
        too_new.min_app = Some("6.5".to_string());

        let mut expired = candidate("2.5", "u", "h");
        expired.max_app = Some("6.2".to_string()); // exclusive at equality

        let mut fits = candidate("2.6", "u", "h");
        fits.min_app = Some("6.0".to_string());
        fits.max_app = Some("7.0".to_string());

        let manifest = Manifest {
            versions: vec![too_new, expired, fits],
        };

        let selected = resolver()
            .select(&extension("2.3", false, false), &manifest)
            .await
            .unwrap();
        assert_eq!(selected.version, "2.6");
    }

    #[tokio::test]
    async fn test_runtime_and_extension_bounds() {
        // env runtime version is 1.85
        let mut needs_newer_runtime = candidate("2.4", "u", "h");
        needs_newer_runtime.min_runtime = Some("2.0".to_string());

        let mut needs_newer_install = candidate("2.5", "u", "h");
        needs_newer_install.min_version = Some("2.4".to_string());

        let mut fits = candidate("2.6", "u", "h");
        fits.min_version = Some("2.0".to_string());
        fits.max_version = Some("3.0".to_string());

        let manifest = Manifest {
            versions: vec![needs_newer_runtime, needs_newer_install, fits],
        };

        let selected = resolver()
            .select(&extension("2.3", false, false), &manifest)
            .await
            .unwrap();
        assert_eq!(selected.version, "2.6");
    }

    struct VetoBeta;

    #[async_trait]
    impl UpdateHooks for VetoBeta {
        async fn validate_candidate(
            &self,
            _extension: &ExtensionDescriptor,
            candidate: &VersionCandidate,
            _manifest: &Manifest,
        ) -> bool {
            !candidate.version.contains("beta")
        }
    }

    #[tokio::test]
    async fn test_hook_vetoes_candidate() {
        let hooks: Arc<Vec<Arc<dyn UpdateHooks>>> = Arc::new(vec![Arc::new(VetoBeta)]);
        let resolver = Resolver::new(ManifestClient::new(), env(), hooks);

        let selected = resolver
            .select(&extension("2.3", false, true), &manifest_of(&["2.4", "3.0-beta"]))
            .await
            .unwrap();
        assert_eq!(selected.version, "2.4");
    }

    #[tokio::test]
    async fn test_check_all_overwrites_pending_set() {
        // Unreachable manifests resolve to nothing, so a sweep after a
        // seeded store must drop the stale entry.
        let mut store = sideload_store::MemoryStore::new();

        let mut stale = std::collections::BTreeMap::new();
        stale.insert("stale".to_string(), candidate("9.9", "u", "h"));
        PendingUpdates::from_map(stale).save(&mut store).unwrap();

        let mut ext = extension("2.3", false, false);
        ext.manifest_url = "http://127.0.0.1:9/manifest.json".to_string();

        let count = resolver().check_all(&[ext], &mut store).await.unwrap();
        assert_eq!(count, 0);
        assert!(PendingUpdates::load(&store).is_empty());
        assert!(store.get(LAST_CHECKED_KEY).is_some());
    }

    #[test]
    fn test_within_bounds() {
        assert!(within_bounds("2.3", None, None));
        assert!(within_bounds("2.3", Some("2.0"), Some("3.0")));
        assert!(within_bounds("2.3", Some("2.3"), None));
        assert!(!within_bounds("2.3", Some("2.4"), None));
        assert!(!within_bounds("2.3", None, Some("2.3")));
        assert!(!within_bounds("2.3", None, Some("2.2")));
    }
}
