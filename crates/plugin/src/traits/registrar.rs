//! Plugin registration capability

use async_trait::async_trait;

use crate::error::RegistrationError;
use crate::types::{LoadedModule, PluginId, PluginType};

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The plugin was added to the registry
    Registered(PluginId),

    /// The identity was already present; the registry is unchanged
    AlreadyRegistered(PluginId),
}

impl Registration {
    /// Identity the outcome refers to
    pub fn plugin_id(&self) -> &PluginId {
        match self {
            Registration::Registered(id) => id,
            Registration::AlreadyRegistered(id) => id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Registration::Registered(_))
    }
}

/// Records plugins exported by imported modules
#[async_trait]
pub trait PluginRegistrar: Send + Sync {
    /// Register the plugin exported by `module` under `plugin_type`
    async fn register_plugin(
        &self,
        module: &LoadedModule,
        plugin_type: PluginType,
    ) -> Result<Registration, RegistrationError>;
}
