//! Manifest-backed module importer
//!
//! An entry module is a YAML document. Evaluating it yields the plugin the
//! module exports:
//!
//! ```yaml
//! plugin:
//!   id: system-logger
//!   name: System Logger
//!   description: Structured logging for the host
//!   capabilities: [logging]
//!   config:
//!     level: info
//! ```
//!
//! Every field is optional. A module without a `plugin` section (including
//! an empty file) exports a plugin identified by its package name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::debug;

use plugin_loader_api::{
    is_valid_plugin_id, ImportError, LoadedModule, ModuleImporter, ModuleSpec, PluginDescriptor,
    QualifiedName,
};

/// Entry module document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    /// Exported plugin
    #[serde(default)]
    pub plugin: Option<PluginExport>,
}

/// The `plugin` section of an entry module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginExport {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

impl ModuleManifest {
    /// Parse a module document; blank documents are empty modules
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Descriptor exported by the module named `name`
    pub fn descriptor(self, name: &QualifiedName) -> PluginDescriptor {
        let export = self.plugin.unwrap_or_default();
        let id = export.id.unwrap_or_else(|| name.package().to_string());

        PluginDescriptor {
            name: export.name.unwrap_or_else(|| id.clone()),
            id,
            description: export.description.unwrap_or_default(),
            capabilities: export.capabilities,
            config: export.config,
        }
    }
}

static GLOBAL_IMPORTER: OnceLock<Arc<ManifestImporter>> = OnceLock::new();

/// [`ModuleImporter`] evaluating YAML entry modules, cached per name
#[derive(Default)]
pub struct ManifestImporter {
    modules: Mutex<HashMap<QualifiedName, Arc<LoadedModule>>>,
}

impl ManifestImporter {
    /// Importer with its own module cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The importer shared by the whole process, created on first use.
    ///
    /// Loaders built with [`PluginLoader::new`](crate::plugin::PluginLoader::new)
    /// import through it, so a module is evaluated once per process.
    pub fn global() -> Arc<ManifestImporter> {
        Arc::clone(GLOBAL_IMPORTER.get_or_init(|| Arc::new(ManifestImporter::new())))
    }

    async fn evaluate(&self, spec: &ModuleSpec) -> Result<LoadedModule, ImportError> {
        let content = match tokio::fs::read_to_string(&spec.origin).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::NotFound {
                    name: spec.name.clone(),
                    origin: spec.origin.clone(),
                });
            }
            Err(e) => {
                return Err(ImportError::Initialization {
                    name: spec.name.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let manifest = ModuleManifest::parse(&content).map_err(|e| ImportError::Initialization {
            name: spec.name.clone(),
            reason: e.to_string(),
        })?;

        let descriptor = manifest.descriptor(&spec.name);
        if !is_valid_plugin_id(&descriptor.id) {
            return Err(ImportError::Initialization {
                name: spec.name.clone(),
                reason: format!("invalid plugin id {:?}", descriptor.id),
            });
        }

        Ok(LoadedModule::new(spec, descriptor))
    }
}

#[async_trait]
impl ModuleImporter for ManifestImporter {
    async fn import_module(&self, spec: &ModuleSpec) -> Result<Arc<LoadedModule>, ImportError> {
        let mut modules = self.modules.lock().await;

        if let Some(module) = modules.get(&spec.name) {
            debug!("Module {} already imported", spec.name);
            return Ok(Arc::clone(module));
        }

        debug!("Importing module {} from {:?}", spec.name, spec.origin);
        let module = Arc::new(self.evaluate(spec).await?);
        modules.insert(spec.name.clone(), Arc::clone(&module));

        Ok(module)
    }
}
