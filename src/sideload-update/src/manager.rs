//! Update manager - main API for update operations.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use sideload_extensions::{
    ExtensionProvider, ExtensionRegistry, HostEnvironment, HostIntegration, NullHost,
};
use sideload_store::SettingsStore;

use crate::client::ManifestClient;
use crate::command::{CommandEnvelope, UpdateRequest};
use crate::error::UpdateResult;
use crate::hooks::UpdateHooks;
use crate::installer::{AppliedUpdate, Installer};
use crate::pending::PendingUpdates;
use crate::resolver::Resolver;
use crate::scheduler::UpdateScheduler;

/// Manager for update operations: composes the registry, resolver, and
/// installer over one settings store.
pub struct UpdateManager {
    registry: ExtensionRegistry,
    resolver: Resolver,
    installer: Installer,
    store: RwLock<Box<dyn SettingsStore>>,
}

impl UpdateManager {
    /// Start building a manager for the given host environment.
    pub fn builder(env: HostEnvironment, store: impl SettingsStore + 'static) -> UpdateManagerBuilder {
        UpdateManagerBuilder {
            env,
            store: Box::new(store),
            providers: Vec::new(),
            hooks: Vec::new(),
            host: Arc::new(NullHost),
        }
    }

    /// One resolver sweep over all managed extensions; overwrites the
    /// pending set and returns the number of pending updates.
    pub async fn check_all(&self) -> UpdateResult<usize> {
        let extensions = self.registry.discover().await;
        let mut store = self.store.write().await;
        self.resolver.check_all(&extensions, store.as_mut()).await
    }

    /// Read the stored pending set.
    pub async fn pending(&self) -> PendingUpdates {
        let store = self.store.read().await;
        PendingUpdates::load(store.as_ref())
    }

    /// Apply one pending update.
    pub async fn apply(&self, request: &UpdateRequest) -> UpdateResult<AppliedUpdate> {
        // The store is only held while the pending entry is consumed;
        // the download and swap run without it.
        let (target, candidate) = {
            let mut store = self.store.write().await;
            self.installer.consume(request, store.as_mut())?
        };
        self.installer.install(&target, &candidate).await
    }

    /// Apply one pending update, rendering the outcome as an envelope.
    pub async fn handle(&self, request: &UpdateRequest) -> CommandEnvelope {
        match self.apply(request).await {
            Ok(applied) => {
                tracing::info!(
                    extension = %applied.id,
                    version = %applied.version,
                    "Update applied"
                );
                CommandEnvelope::ok()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Update rejected");
                CommandEnvelope::failure(&e)
            }
        }
    }

    /// Spawn a periodic resolver sweep over this manager.
    pub fn schedule(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        UpdateScheduler::new(interval).spawn(self)
    }
}

/// Builder assembling an [`UpdateManager`] from its collaborators.
pub struct UpdateManagerBuilder {
    env: HostEnvironment,
    store: Box<dyn SettingsStore>,
    providers: Vec<Arc<dyn ExtensionProvider>>,
    hooks: Vec<Arc<dyn UpdateHooks>>,
    host: Arc<dyn HostIntegration>,
}

impl UpdateManagerBuilder {
    /// Register an extension provider.
    pub fn provider(mut self, provider: impl ExtensionProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Register an update observer.
    pub fn hooks(mut self, hooks: impl UpdateHooks + 'static) -> Self {
        self.hooks.push(Arc::new(hooks));
        self
    }

    /// Set the host integration (defaults to [`NullHost`]).
    pub fn host(mut self, host: impl HostIntegration + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    /// Assemble the manager.
    pub fn build(self) -> UpdateManager {
        let mut registry = ExtensionRegistry::new(self.env.paths.clone());
        for provider in self.providers {
            registry.add_provider(provider);
        }

        let client = ManifestClient::new();
        let hooks = Arc::new(self.hooks);

        UpdateManager {
            registry,
            resolver: Resolver::new(client.clone(), self.env.clone(), hooks.clone()),
            installer: Installer::new(client, self.env.paths.clone(), self.host, hooks),
            store: RwLock::new(self.store),
        }
    }
}
