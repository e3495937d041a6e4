//! Main configuration structure and implementation

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use plugin_loader_api::PluginType;

use super::PluginRoots;
use crate::plugin::{DiscoveryStrategy, ModuleClassifier};

/// Supported configuration version
pub const CONFIG_VERSION: &str = "1.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Plugin roots per plugin type
    #[serde(default)]
    pub roots: PluginRoots,

    /// Naming convention overrides per plugin type
    #[serde(default)]
    pub strategies: BTreeMap<PluginType, DiscoveryStrategy>,

    /// Treat any per-plugin failure as a failed run
    #[serde(default)]
    pub fail_on_error: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(anyhow!(
                "Unsupported configuration version: {}",
                self.version
            ));
        }

        for (plugin_type, strategy) in &self.strategies {
            strategy
                .validate()
                .map_err(|e| anyhow!("Invalid {} strategy: {}", plugin_type, e))?;
        }

        Ok(())
    }

    /// Classifier applying the configured strategy overrides
    pub fn classifier(&self) -> Result<ModuleClassifier> {
        self.strategies
            .iter()
            .try_fold(ModuleClassifier::new(), |classifier, (plugin_type, strategy)| {
                classifier
                    .with_strategy(*plugin_type, strategy.clone())
                    .map_err(|e| anyhow!("Invalid {} strategy: {}", plugin_type, e))
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            roots: PluginRoots::default(),
            strategies: BTreeMap::new(),
            fail_on_error: false,
        }
    }
}
