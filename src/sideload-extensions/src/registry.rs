//! Extension registry: collects registrations and resolves descriptors.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::extension::{ExtensionDescriptor, ExtensionRegistration};
use crate::host::HostPaths;
use crate::provider::ExtensionProvider;

/// Registry of the extensions the updater manages.
///
/// Providers are queried fresh on every [`discover`](Self::discover) call;
/// nothing is cached between checks. Later providers override earlier ones
/// when both register the same file.
pub struct ExtensionRegistry {
    paths: HostPaths,
    providers: Vec<Arc<dyn ExtensionProvider>>,
}

impl ExtensionRegistry {
    /// Create an empty registry for the given host paths.
    pub fn new(paths: HostPaths) -> Self {
        Self {
            paths,
            providers: Vec::new(),
        }
    }

    /// Register a provider.
    pub fn add_provider(&mut self, provider: Arc<dyn ExtensionProvider>) {
        self.providers.push(provider);
    }

    /// Register a provider, builder style.
    pub fn with_provider(mut self, provider: impl ExtensionProvider + 'static) -> Self {
        self.add_provider(Arc::new(provider));
        self
    }

    /// The host paths this registry classifies against.
    pub fn paths(&self) -> &HostPaths {
        &self.paths
    }

    /// Enumerate all currently manageable extensions.
    ///
    /// Registrations that cannot be resolved (missing or invalid metadata,
    /// file outside both extension roots) are logged and skipped.
    pub async fn discover(&self) -> Vec<ExtensionDescriptor> {
        let mut registrations: BTreeMap<PathBuf, ExtensionRegistration> = BTreeMap::new();
        for provider in &self.providers {
            for registration in provider.registrations().await {
                registrations.insert(registration.file.clone(), registration);
            }
        }

        let mut extensions = Vec::new();
        for registration in registrations.values() {
            match ExtensionDescriptor::resolve(registration, &self.paths) {
                Ok(descriptor) => extensions.push(descriptor),
                Err(e) => {
                    tracing::warn!(
                        file = %registration.file.display(),
                        error = %e,
                        "Skipping unresolvable extension registration"
                    );
                }
            }
        }
        extensions
    }
}
