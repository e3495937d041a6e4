//! Entry module classification
//!
//! Each [`PluginType`] maps to a [`DiscoveryStrategy`] naming the entry
//! modules a package must expose to load under that tier. Packages rejected
//! on their own name or file type are never opened.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use plugin_loader_api::{ModuleSpec, PluginType, QualifiedName};

use crate::plugin::enumerator::{CandidatePackage, PackageSource};
use crate::utils;

fn default_package_pattern() -> String {
    "*".to_string()
}

/// Naming convention applied to packages for one plugin type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStrategy {
    /// Entry module names, in priority order
    pub entry_modules: Vec<String>,

    /// Glob the package name must match
    #[serde(default = "default_package_pattern")]
    pub package_pattern: String,
}

impl DiscoveryStrategy {
    /// Strategy matching any package that exposes one of `entry_modules`
    pub fn new<I, S>(entry_modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entry_modules: entry_modules.into_iter().map(Into::into).collect(),
            package_pattern: default_package_pattern(),
        }
    }

    /// Restrict the strategy to packages matching `pattern`
    pub fn with_package_pattern(mut self, pattern: &str) -> Self {
        self.package_pattern = pattern.to_string();
        self
    }

    /// Built-in convention for a plugin type
    pub fn for_type(plugin_type: PluginType) -> Self {
        match plugin_type {
            PluginType::Bootstrap => Self::new(["sys_module"]),
            PluginType::System | PluginType::User => Self::new(["plugin_module", "test_module"]),
        }
    }

    /// Validate the strategy
    pub fn validate(&self) -> Result<()> {
        if self.entry_modules.is_empty() {
            return Err(anyhow!("Strategy must name at least one entry module"));
        }

        for module in &self.entry_modules {
            if !utils::is_identifier(module) {
                return Err(anyhow!("Invalid entry module name: {:?}", module));
            }
        }

        self.compile_pattern()?;
        Ok(())
    }

    /// Compiled package pattern; `None` when every package name matches
    fn compile_pattern(&self) -> Result<Option<glob::Pattern>> {
        if self.package_pattern == "*" {
            return Ok(None);
        }

        glob::Pattern::new(&self.package_pattern)
            .map(Some)
            .map_err(|e| anyhow!("Invalid package pattern {:?}: {}", self.package_pattern, e))
    }
}

/// Strategy with its package pattern compiled once
#[derive(Debug, Clone)]
struct CompiledStrategy {
    strategy: DiscoveryStrategy,
    pattern: Option<glob::Pattern>,
}

impl CompiledStrategy {
    fn builtin(plugin_type: PluginType) -> Self {
        Self {
            strategy: DiscoveryStrategy::for_type(plugin_type),
            pattern: None,
        }
    }

    fn accepts_package(&self, name: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.matches(name))
    }
}

/// Decides which entry module, if any, a candidate package exposes
#[derive(Debug, Clone)]
pub struct ModuleClassifier {
    strategies: HashMap<PluginType, CompiledStrategy>,
}

impl ModuleClassifier {
    /// Classifier using the built-in convention for every plugin type
    pub fn new() -> Self {
        let strategies = PluginType::ALL
            .iter()
            .map(|t| (*t, CompiledStrategy::builtin(*t)))
            .collect();
        Self { strategies }
    }

    /// Replace the strategy for one plugin type
    pub fn with_strategy(
        mut self,
        plugin_type: PluginType,
        strategy: DiscoveryStrategy,
    ) -> Result<Self> {
        strategy.validate()?;
        let pattern = strategy.compile_pattern()?;
        self.strategies
            .insert(plugin_type, CompiledStrategy { strategy, pattern });
        Ok(self)
    }

    /// Strategy in effect for `plugin_type`
    pub fn strategy(&self, plugin_type: PluginType) -> DiscoveryStrategy {
        self.strategies
            .get(&plugin_type)
            .map(|compiled| compiled.strategy.clone())
            .unwrap_or_else(|| DiscoveryStrategy::for_type(plugin_type))
    }

    /// Resolve the entry module of `candidate` for `plugin_type`.
    ///
    /// Returns `None` when the package does not follow the convention;
    /// the caller skips it. The package directory is never listed: only
    /// the entry module names of the strategy are looked up, in order.
    pub fn classify(
        &self,
        source: &dyn PackageSource,
        candidate: &CandidatePackage,
        plugin_type: PluginType,
    ) -> Option<ModuleSpec> {
        if !candidate.is_dir {
            debug!("Skipping {:?}: not a directory", candidate.path);
            return None;
        }

        if !utils::is_identifier(&candidate.name) || candidate.name.starts_with('_') {
            debug!("Skipping {:?}: not a public package name", candidate.path);
            return None;
        }

        // Every plugin type has a strategy from `new`
        let compiled = self.strategies.get(&plugin_type)?;

        if !compiled.accepts_package(&candidate.name) {
            debug!(
                "Skipping {:?}: does not match {:?}",
                candidate.path, compiled.strategy.package_pattern
            );
            return None;
        }

        let found = compiled.strategy.entry_modules.iter().find_map(|entry| {
            source
                .find_module(&candidate.path, entry)
                .map(|origin| (entry, origin))
        });

        match found {
            Some((entry, origin)) => Some(ModuleSpec::new(
                QualifiedName::new(&candidate.name, entry),
                origin,
            )),
            None => {
                debug!(
                    "Package {} has no {} entry module",
                    candidate.name, plugin_type
                );
                None
            }
        }
    }
}

impl Default for ModuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}
