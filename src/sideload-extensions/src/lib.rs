//! Sideload Extensions - the extension model for the sideload updater.
//!
//! An *extension* is a plugin or theme installed under one of the host
//! application's extension roots and managed by the updater. Hosts describe
//! what to manage through [`ExtensionProvider`] implementations; the
//! [`ExtensionRegistry`] turns those registrations into fully resolved
//! [`ExtensionDescriptor`]s by reading each extension's metadata file.
//!
//! Host-side concerns the updater cannot own (plugin activation, listing
//! caches) sit behind the [`HostIntegration`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use sideload_extensions::{ExtensionRegistry, ExtensionRegistration, StaticProvider, HostPaths};
//!
//! let paths = HostPaths::new("/srv/app/plugins", "/srv/app/themes");
//! let provider = StaticProvider::new(vec![ExtensionRegistration {
//!     file: "/srv/app/plugins/analytics/plugin.toml".into(),
//!     manifest_url: "https://example.com/analytics/manifest.json".into(),
//!     restrict_major: true,
//!     allow_experimental: false,
//! }]);
//!
//! let registry = ExtensionRegistry::new(paths).with_provider(provider);
//! let extensions = registry.discover().await;
//! ```

pub mod error;
pub mod extension;
pub mod host;
pub mod metadata;
pub mod provider;
pub mod registry;
pub mod version;

pub use error::{ExtensionError, Result};
pub use extension::{ExtensionDescriptor, ExtensionKind, ExtensionRegistration};
pub use host::{HostEnvironment, HostIntegration, HostPaths, NullHost, PluginActivation};
pub use metadata::ExtensionMetadata;
pub use provider::{ExtensionProvider, StaticProvider};
pub use registry::ExtensionRegistry;

/// Conventional metadata filename for plugins.
pub const PLUGIN_METADATA_FILE: &str = "plugin.toml";

/// Conventional metadata filename for themes.
pub const THEME_METADATA_FILE: &str = "theme.toml";
