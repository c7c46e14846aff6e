//! End-to-end flows over the public API.

use std::collections::BTreeMap;
use std::sync::Arc;

use sideload_extensions::{
    ExtensionDescriptor, ExtensionKind, ExtensionRegistration, HostEnvironment, HostPaths,
    StaticProvider, version::major_of,
};
use sideload_store::{MemoryStore, SettingsStore};
use sideload_update::{
    Manifest, ManifestClient, PendingUpdates, Resolver, UpdateError, UpdateManager, UpdateRequest,
    VersionCandidate,
};

fn candidate(version: &str, url: &str, hash: &str) -> VersionCandidate {
    serde_json::from_value(serde_json::json!({
        "version": version,
        "url": url,
        "hash": hash,
    }))
    .unwrap()
}

fn extension(paths: &HostPaths, version: &str) -> ExtensionDescriptor {
    let file = paths.plugins_dir.join("analytics/plugin.toml");
    ExtensionDescriptor {
        dir: file.parent().unwrap().to_path_buf(),
        id: "analytics/plugin.toml".to_string(),
        kind: ExtensionKind::Plugin,
        name: "Analytics".to_string(),
        version: version.to_string(),
        major_version: major_of(version),
        manifest_url: "https://example.com/manifest.json".to_string(),
        restrict_major: true,
        allow_experimental: false,
        homepage: None,
        file,
    }
}

fn env(paths: HostPaths) -> HostEnvironment {
    HostEnvironment::new("6.2", "1.85", paths)
}

#[tokio::test]
async fn resolver_selects_within_policy() {
    let paths = HostPaths::new("/srv/app/plugins", "/srv/app/themes");
    let resolver = Resolver::new(ManifestClient::new(), env(paths.clone()), Arc::new(Vec::new()));

    let manifest = Manifest {
        versions: vec![
            candidate("2.4", "https://example.com/a-2.4.zip", "aa"),
            candidate("3.0-beta", "https://example.com/a-3.0b.zip", "bb"),
            candidate("2.2", "https://example.com/a-2.2.zip", "cc"),
        ],
    };

    let selected = resolver
        .select(&extension(&paths, "2.3"), &manifest)
        .await
        .unwrap();
    assert_eq!(selected.version, "2.4");
}

#[tokio::test]
async fn consumed_identity_reports_no_update_on_retry() {
    let root = tempfile::tempdir().unwrap();
    let paths = HostPaths::new(root.path().join("plugins"), root.path().join("themes"));

    let plugin_dir = paths.plugins_dir.join("analytics");
    std::fs::create_dir_all(&plugin_dir).unwrap();
    let file = plugin_dir.join("plugin.toml");
    std::fs::write(&file, "[extension]\nname = \"Analytics\"\nversion = \"2.3\"\n").unwrap();

    // Seed a pending entry whose package URL is unreachable: the first
    // apply consumes the entry and then fails in transit, the second must
    // already see nothing pending.
    let mut store = MemoryStore::new();
    let mut map = BTreeMap::new();
    map.insert(
        file.to_string_lossy().replace('\\', "/"),
        candidate("2.4", "http://127.0.0.1:9/analytics-2.4.zip", "aa"),
    );
    store.set("updates", serde_json::to_value(&PendingUpdates::from_map(map)).unwrap());
    store.flush().unwrap();

    let manager = UpdateManager::builder(env(paths), store)
        .provider(StaticProvider::new(vec![ExtensionRegistration {
            file,
            manifest_url: "https://example.com/manifest.json".to_string(),
            restrict_major: false,
            allow_experimental: false,
        }]))
        .build();

    let request = UpdateRequest::Plugin("analytics/plugin.toml".to_string());

    let first = manager.apply(&request).await;
    assert!(matches!(first, Err(UpdateError::Network(_))));
    assert!(manager.pending().await.is_empty());

    let second = manager.apply(&request).await;
    assert!(matches!(second, Err(UpdateError::NoUpdate)));
}

#[tokio::test]
async fn concurrent_sweeps_converge() {
    let paths = HostPaths::new("/srv/app/plugins", "/srv/app/themes");
    let resolver = Arc::new(Resolver::new(
        ManifestClient::new(),
        env(paths.clone()),
        Arc::new(Vec::new()),
    ));

    let manifest = Manifest {
        versions: vec![
            candidate("2.4", "https://example.com/a-2.4.zip", "aa"),
            candidate("2.5", "https://example.com/a-2.5.zip", "bb"),
        ],
    };
    let ext = extension(&paths, "2.3");

    // Two sweeps over the same manifests racing on one store: whatever
    // the interleaving, the final stored mapping is the same.
    let store = Arc::new(tokio::sync::Mutex::new(MemoryStore::new()));

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let resolver = Arc::clone(&resolver);
        let manifest = manifest.clone();
        let ext = ext.clone();
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let selected = resolver.select(&ext, &manifest).await.unwrap();
            let mut map = BTreeMap::new();
            map.insert(ext.file_key(), selected);
            let pending = PendingUpdates::from_map(map);
            let mut store = store.lock().await;
            pending.save(&mut *store).unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let store = store.lock().await;
    let final_state = PendingUpdates::load(&*store);
    assert_eq!(final_state.len(), 1);
    assert_eq!(
        final_state.get(&ext.file_key()).unwrap().version,
        "2.5"
    );
}
