//! Host application environment and integration seams.

use async_trait::async_trait;
use std::path::PathBuf;

/// Filesystem roots the host installs extensions under.
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// Directory containing plugin directories
    pub plugins_dir: PathBuf,
    /// Directory containing theme directories
    pub themes_dir: PathBuf,
}

impl HostPaths {
    /// Create host paths from the two extension roots.
    pub fn new(plugins_dir: impl Into<PathBuf>, themes_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            themes_dir: themes_dir.into(),
        }
    }
}

/// Versions and paths describing the embedding host application.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    /// Host application version, matched against `min_app`/`max_app`
    pub app_version: String,
    /// Host runtime version, matched against `min_runtime`/`max_runtime`
    pub runtime_version: String,
    /// Extension roots
    pub paths: HostPaths,
}

impl HostEnvironment {
    /// Create a host environment.
    pub fn new(
        app_version: impl Into<String>,
        runtime_version: impl Into<String>,
        paths: HostPaths,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            runtime_version: runtime_version.into(),
            paths,
        }
    }
}

/// Activation state of a plugin as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginActivation {
    /// Plugin is currently active
    pub active: bool,
    /// Active across the whole installation rather than a single site
    pub global: bool,
}

/// Host-side operations the installer needs around a file swap.
///
/// The updater never talks to the host's plugin machinery directly; it
/// records the activation state, deactivates before touching files, and
/// reactivates afterwards through this interface. Hosts without an
/// activation concept can use [`NullHost`].
#[async_trait]
pub trait HostIntegration: Send + Sync {
    /// Report the activation state of a plugin before the swap.
    async fn plugin_activation(&self, id: &str) -> PluginActivation;

    /// Deactivate a plugin prior to replacing its files.
    async fn deactivate_plugin(&self, id: &str, global: bool);

    /// Reactivate a plugin after its files were replaced.
    async fn activate_plugin(&self, id: &str, global: bool);

    /// Drop any cached plugin listing the host holds.
    async fn clear_plugin_cache(&self);

    /// Drop any cached theme listing the host holds.
    async fn clear_theme_cache(&self);
}

/// No-op host integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

#[async_trait]
impl HostIntegration for NullHost {
    async fn plugin_activation(&self, _id: &str) -> PluginActivation {
        PluginActivation::default()
    }

    async fn deactivate_plugin(&self, _id: &str, _global: bool) {}

    async fn activate_plugin(&self, _id: &str, _global: bool) {}

    async fn clear_plugin_cache(&self) {}

    async fn clear_theme_cache(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_host_reports_inactive() {
        let host = NullHost;
        let activation = host.plugin_activation("analytics/plugin.toml").await;
        assert!(!activation.active);
        assert!(!activation.global);
    }
}
