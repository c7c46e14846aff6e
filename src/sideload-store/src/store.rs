//! Settings store interface.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

/// Key-value settings storage with an explicit dirty flag.
///
/// Mutations only mark the store dirty when they change a stored value;
/// [`flush`](Self::flush) on a clean store is a no-op. Callers decide when
/// to flush; nothing is persisted implicitly.
pub trait SettingsStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value.
    fn set(&mut self, key: &str, value: Value);

    /// Remove a value.
    fn remove(&mut self, key: &str);

    /// Whether unflushed changes exist.
    fn is_dirty(&self) -> bool;

    /// Persist pending changes.
    fn flush(&mut self) -> Result<()>;
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
    dirty: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) -> Result<()> {
        self.dirty = false;
        Ok(())
    }
}
