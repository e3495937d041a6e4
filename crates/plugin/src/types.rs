//! Core data types shared by the loader and its collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Plugin identifier
pub type PluginId = String;

/// Loading tier a plugin belongs to.
///
/// Tiers are ordered: bootstrap plugins load before system plugins, which
/// load before user plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    /// Plugins required to bring the host itself up
    Bootstrap,

    /// Framework-level plugins
    System,

    /// Application plugins
    User,
}

impl PluginType {
    /// All tiers in load order
    pub const ALL: [PluginType; 3] = [PluginType::Bootstrap, PluginType::System, PluginType::User];

    /// Lowercase name of the tier
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Bootstrap => "bootstrap",
            PluginType::System => "system",
            PluginType::User => "user",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = UnknownPluginType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bootstrap" => Ok(PluginType::Bootstrap),
            "system" => Ok(PluginType::System),
            "user" => Ok(PluginType::User),
            _ => Err(UnknownPluginType(s.to_string())),
        }
    }
}

/// Returned when a string does not name a plugin type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plugin type: {0} (expected bootstrap, system or user)")]
pub struct UnknownPluginType(pub String);

/// Fully-qualified module name, `<package>.<module>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct QualifiedName {
    package: String,
    module: String,
}

impl QualifiedName {
    /// Join a package and a module name
    pub fn new(package: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            module: module.into(),
        }
    }

    /// Package part
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Module part
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.module)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for QualifiedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((package, module))
                if !package.is_empty() && !module.is_empty() && !module.contains('.') =>
            {
                Ok(Self::new(package, module))
            }
            _ => Err(format!("not a qualified module name: {s}")),
        }
    }
}

impl PartialEq<str> for QualifiedName {
    fn eq(&self, other: &str) -> bool {
        other
            .split_once('.')
            .map(|(p, m)| p == self.package && m == self.module)
            .unwrap_or(false)
    }
}

impl PartialEq<&str> for QualifiedName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// A resolved entry module: its qualified name and the file backing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Qualified module name
    pub name: QualifiedName,

    /// Module source file
    pub origin: PathBuf,
}

impl ModuleSpec {
    pub fn new(name: QualifiedName, origin: PathBuf) -> Self {
        Self { name, origin }
    }
}

/// Plugin descriptor exported by an entry module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin identity
    pub id: PluginId,

    /// Human-readable name
    pub name: String,

    /// Plugin description
    #[serde(default)]
    pub description: String,

    /// Capabilities the plugin advertises
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Plugin-specific configuration
    #[serde(default)]
    pub config: serde_yaml::Value,
}

impl PluginDescriptor {
    /// Descriptor with only an identity; the name mirrors the id
    pub fn new(id: impl Into<PluginId>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            capabilities: Vec::new(),
            config: serde_yaml::Value::Null,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Add capability
    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capabilities.push(capability.to_string());
        self
    }
}

/// Check whether `id` can serve as a plugin identity
pub fn is_valid_plugin_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(char::is_whitespace)
}

/// Result of a successful module import
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Qualified module name
    pub name: QualifiedName,

    /// Module source file
    pub origin: PathBuf,

    /// Plugin exported by the module
    pub plugin: PluginDescriptor,

    /// When the module was evaluated
    pub loaded_at: DateTime<Utc>,
}

impl LoadedModule {
    pub fn new(spec: &ModuleSpec, plugin: PluginDescriptor) -> Self {
        Self {
            name: spec.name.clone(),
            origin: spec.origin.clone(),
            plugin,
            loaded_at: Utc::now(),
        }
    }
}
