//! Plugin root configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use plugin_loader_api::PluginType;

use crate::utils;

/// Root directories to scan, per plugin type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRoots {
    /// Roots scanned for bootstrap plugins
    #[serde(default)]
    pub bootstrap: Vec<PathBuf>,

    /// Roots scanned for system plugins
    #[serde(default)]
    pub system: Vec<PathBuf>,

    /// Roots scanned for user plugins
    #[serde(default)]
    pub user: Vec<PathBuf>,
}

impl PluginRoots {
    /// Roots configured for `plugin_type`
    pub fn for_type(&self, plugin_type: PluginType) -> &[PathBuf] {
        match plugin_type {
            PluginType::Bootstrap => &self.bootstrap,
            PluginType::System => &self.system,
            PluginType::User => &self.user,
        }
    }

    /// Copy with `~` and environment variables expanded in every root
    pub fn expanded(&self) -> Result<Self> {
        let expand = |roots: &[PathBuf]| -> Result<Vec<PathBuf>> {
            roots.iter().map(|root| utils::expand_path(root)).collect()
        };

        Ok(Self {
            bootstrap: expand(&self.bootstrap)?,
            system: expand(&self.system)?,
            user: expand(&self.user)?,
        })
    }

    /// Whether no tier has any root configured
    pub fn is_empty(&self) -> bool {
        self.bootstrap.is_empty() && self.system.is_empty() && self.user.is_empty()
    }
}

impl Default for PluginRoots {
    fn default() -> Self {
        let mut user = vec![PathBuf::from("./plugins/user")];
        if let Ok(config_dir) = utils::get_config_dir() {
            user.push(config_dir.join("plugins"));
        }

        Self {
            bootstrap: vec![PathBuf::from("./plugins/bootstrap")],
            system: vec![PathBuf::from("./plugins/system")],
            user,
        }
    }
}
