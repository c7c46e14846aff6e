//! JSON file-backed settings store.

use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::SettingsStore;

/// Settings store persisting one JSON object per namespace file.
///
/// Content is loaded eagerly at open time. `flush` writes the whole blob
/// and fsyncs it so a crash right after an update check cannot lose the
/// pending set.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open a namespace file, loading any existing content.
    ///
    /// A missing file yields an empty store; an unreadable or malformed
    /// file is an error so state is never silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    /// Path of the namespace file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
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
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        let mut file = std::fs::File::create(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        // Ensure data is durably written to disk to survive a crash
        file.sync_all()?;

        #[cfg(unix)]
        {
            if let Some(parent) = self.path.parent() {
                if let Ok(dir) = std::fs::File::open(parent) {
                    let _ = dir.sync_all();
                }
            }
        }

        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "Settings flushed");
        Ok(())
    }
}
