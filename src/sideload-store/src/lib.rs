//! Sideload Store - persisted settings for the sideload updater.
//!
//! The updater keeps its state (the pending-updates set, the last check
//! timestamp) in a single namespaced key-value blob behind the
//! [`SettingsStore`] interface: `get`/`set`/`remove` plus an explicit
//! dirty flag and `flush`. Writes that do not change a stored value leave
//! the store clean, so redundant flushes cost nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use sideload_store::{JsonFileStore, SettingsStore};
//!
//! let mut store = JsonFileStore::open("/var/lib/app/sideload.json")?;
//! store.set("updates", serde_json::json!({}));
//! store.flush()?;
//! # Ok::<(), sideload_store::StoreError>(())
//! ```

pub mod error;
pub mod json;
pub mod store;

pub use error::{Result, StoreError};
pub use json::JsonFileStore;
pub use store::{MemoryStore, SettingsStore};
