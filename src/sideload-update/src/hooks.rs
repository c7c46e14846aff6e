//! Update lifecycle hooks.
//!
//! Hosts observe and influence the update flow through this interface,
//! registered at construction. All methods default to no-ops that accept
//! everything.

use async_trait::async_trait;

use sideload_extensions::{ExtensionDescriptor, ExtensionKind};

use crate::manifest::{Manifest, VersionCandidate};

/// Observer interface for resolution and installation events.
#[async_trait]
pub trait UpdateHooks: Send + Sync {
    /// Additional validation for an otherwise-acceptable candidate.
    /// Returning `false` vetoes the candidate.
    async fn validate_candidate(
        &self,
        _extension: &ExtensionDescriptor,
        _candidate: &VersionCandidate,
        _manifest: &Manifest,
    ) -> bool {
        true
    }

    /// Called before an extension's files are touched.
    async fn before_update(&self, _file: &str, _id: &str, _kind: ExtensionKind) {}

    /// Called after an extension was replaced, with its possibly changed
    /// identity.
    async fn after_update(&self, _file: &str, _id: &str, _kind: ExtensionKind) {}
}
