//! Plugin Loader Library
//!
//! Discovers plugin packages under configured root directories, imports
//! their entry modules and registers the plugins they export into a
//! process-wide registry, one loading tier at a time.

pub mod cli;
pub mod config;
pub mod plugin;
pub mod utils;

pub use config::{Config, PluginRoots};
pub use plugin::{
    DiscoveryStrategy, LoadReport, ModuleClassifier, PluginLoader, PluginRegistry, PluginType,
    RegistryEntry,
};

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Host context tying configuration, loader and registry together
pub struct PluginHost {
    config: Config,
    registry: Arc<PluginRegistry>,
    loader: PluginLoader,
}

impl PluginHost {
    /// Create a host registering into the process-wide registry
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, PluginRegistry::global())
    }

    /// Create a host registering into `registry`
    pub fn with_registry(config: Config, registry: Arc<PluginRegistry>) -> Result<Self> {
        config.validate()?;

        let loader = PluginLoader::new(registry.clone()).with_classifier(config.classifier()?);

        Ok(Self {
            config,
            registry,
            loader,
        })
    }

    /// Load all configured plugins, bootstrap tier first
    pub async fn initialize_plugins(&self) -> Result<Vec<LoadReport>> {
        info!("Initializing plugin system");

        if self.config.roots.is_empty() {
            warn!("No plugin roots configured");
        }

        let roots = self.config.roots.expanded()?;
        let reports = self.loader.load_phases(&roots).await;

        let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
        if failures > 0 {
            warn!("Plugin system initialized with {} failures", failures);
        } else {
            info!("Plugin system initialized successfully");
        }

        Ok(reports)
    }

    /// Load plugins of one type from explicit roots
    pub async fn load(&self, plugin_type: PluginType, roots: &[PathBuf]) -> Result<LoadReport> {
        let roots = roots
            .iter()
            .map(|root| utils::expand_path(root))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.loader.load_plugins_from_roots(&roots, plugin_type).await)
    }

    /// Registered plugins, ordered by type then identity
    pub async fn get_plugin_info(&self) -> Vec<RegistryEntry> {
        self.registry.entries().await
    }

    /// Whether the reports should fail the run under the current configuration
    pub fn should_fail(&self, reports: &[LoadReport]) -> bool {
        self.config.fail_on_error && reports.iter().any(|r| !r.is_clean())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

/// Application error types
#[derive(thiserror::Error, Debug)]
pub enum PluginLoaderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plugin loading finished with {0} failures")]
    LoadFailed(usize),
}

/// Result type for the main application
pub type PluginLoaderResult<T> = Result<T, PluginLoaderError>;
