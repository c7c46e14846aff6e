//! Extension providers.
//!
//! A provider is the host's way of declaring which extensions the updater
//! manages. Providers are registered at construction; there is no
//! broadcast discovery.

use async_trait::async_trait;

use crate::extension::ExtensionRegistration;

/// Source of extension registrations to manage.
#[async_trait]
pub trait ExtensionProvider: Send + Sync {
    /// Return the registrations this provider manages.
    async fn registrations(&self) -> Vec<ExtensionRegistration>;
}

/// Provider over a fixed registration list.
pub struct StaticProvider {
    registrations: Vec<ExtensionRegistration>,
}

impl StaticProvider {
    /// Create a provider from a fixed list.
    pub fn new(registrations: Vec<ExtensionRegistration>) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl ExtensionProvider for StaticProvider {
    async fn registrations(&self) -> Vec<ExtensionRegistration> {
        self.registrations.clone()
    }
}
