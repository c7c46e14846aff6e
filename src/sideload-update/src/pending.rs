//! The persisted pending-updates set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sideload_store::SettingsStore;

use crate::error::UpdateResult;
use crate::manifest::VersionCandidate;

/// Store key the pending set lives under.
pub const UPDATES_KEY: &str = "updates";

/// Store key recording when the last resolver sweep ran.
pub const LAST_CHECKED_KEY: &str = "last_checked";

/// Resolved-but-not-applied updates, keyed by the extension's normalized
/// metadata-file path. Produced whole by a resolver sweep; entries are
/// consumed one at a time by the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingUpdates {
    updates: BTreeMap<String, VersionCandidate>,
}

impl PendingUpdates {
    /// Build a set from a resolved mapping.
    pub fn from_map(updates: BTreeMap<String, VersionCandidate>) -> Self {
        Self { updates }
    }

    /// Read the set from the store. Missing or unreadable state yields an
    /// empty set.
    pub fn load(store: &dyn SettingsStore) -> Self {
        store
            .get(UPDATES_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Overwrite the stored set and flush.
    pub fn save(&self, store: &mut dyn SettingsStore) -> UpdateResult<()> {
        store.set(UPDATES_KEY, serde_json::to_value(self)?);
        store.flush()?;
        Ok(())
    }

    /// Number of pending updates.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Look up the candidate for an extension.
    pub fn get(&self, file: &str) -> Option<&VersionCandidate> {
        self.updates.get(file)
    }

    /// Remove and return the entry for an extension.
    pub fn take(&mut self, file: &str) -> Option<VersionCandidate> {
        self.updates.remove(file)
    }

    /// Iterate over the pending entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VersionCandidate)> {
        self.updates.iter()
    }

    /// The extension keys with a pending update.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.updates.keys()
    }
}
