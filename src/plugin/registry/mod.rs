//! Process-wide plugin registry
//!
//! The registry maps plugin identity to the plugin's descriptor. Entries are
//! only ever added through [`PluginRegistrar::register_plugin`]; everything
//! else reads through the query methods.
//!
//! Duplicate policy: the first registration of an identity wins. Registering
//! an identity that is already present leaves the registry unchanged and
//! reports [`Registration::AlreadyRegistered`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use plugin_loader_api::{
    is_valid_plugin_id, LoadedModule, PluginDescriptor, PluginId, PluginRegistrar, PluginType,
    QualifiedName, Registration, RegistrationError,
};

/// Plugin registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Plugin descriptor
    pub descriptor: PluginDescriptor,

    /// Tier the plugin was loaded under
    pub plugin_type: PluginType,

    /// Entry module that exported the plugin
    pub module: QualifiedName,

    /// Entry module file
    pub origin: PathBuf,

    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

impl RegistryEntry {
    pub fn id(&self) -> &PluginId {
        &self.descriptor.id
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<PluginRegistry>> = OnceLock::new();

/// Registry of loaded plugins, keyed by identity
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<PluginId, RegistryEntry>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process, created on first use
    pub fn global() -> Arc<PluginRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(PluginRegistry::new())))
    }

    /// Get plugin by ID
    pub async fn get(&self, plugin_id: &str) -> Option<RegistryEntry> {
        self.plugins.read().await.get(plugin_id).cloned()
    }

    /// Whether `plugin_id` is registered
    pub async fn contains(&self, plugin_id: &str) -> bool {
        self.plugins.read().await.contains_key(plugin_id)
    }

    /// Number of registered plugins
    pub async fn len(&self) -> usize {
        self.plugins.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plugins.read().await.is_empty()
    }

    /// All entries, ordered by plugin type then identity
    pub async fn entries(&self) -> Vec<RegistryEntry> {
        let plugins = self.plugins.read().await;
        let mut entries: Vec<_> = plugins.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.plugin_type
                .cmp(&b.plugin_type)
                .then_with(|| a.descriptor.id.cmp(&b.descriptor.id))
        });
        entries
    }

    /// Entries registered under `plugin_type`, ordered by identity
    pub async fn by_type(&self, plugin_type: PluginType) -> Vec<RegistryEntry> {
        self.entries()
            .await
            .into_iter()
            .filter(|entry| entry.plugin_type == plugin_type)
            .collect()
    }
}

#[async_trait]
impl PluginRegistrar for PluginRegistry {
    async fn register_plugin(
        &self,
        module: &LoadedModule,
        plugin_type: PluginType,
    ) -> Result<Registration, RegistrationError> {
        let descriptor = &module.plugin;
        if !is_valid_plugin_id(&descriptor.id) {
            return Err(RegistrationError::InvalidIdentity {
                module: module.name.clone(),
                id: descriptor.id.clone(),
            });
        }

        let mut plugins = self.plugins.write().await;

        if let Some(existing) = plugins.get(&descriptor.id) {
            if existing.module != module.name {
                warn!(
                    "Plugin {} from {} conflicts with the one registered by {}; keeping the first",
                    descriptor.id, module.name, existing.module
                );
            } else {
                debug!("Plugin {} already registered", descriptor.id);
            }
            return Ok(Registration::AlreadyRegistered(descriptor.id.clone()));
        }

        plugins.insert(
            descriptor.id.clone(),
            RegistryEntry {
                descriptor: descriptor.clone(),
                plugin_type,
                module: module.name.clone(),
                origin: module.origin.clone(),
                registered_at: Utc::now(),
            },
        );

        info!(
            "Registered {} plugin {} from {}",
            plugin_type, descriptor.id, module.name
        );
        Ok(Registration::Registered(descriptor.id.clone()))
    }
}
