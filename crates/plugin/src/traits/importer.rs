//! Module import capability

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ImportError;
use crate::types::{LoadedModule, ModuleSpec};

/// Imports entry modules by qualified name.
///
/// Implementations evaluate a module's top-level code at most once per
/// process and return the cached module for every later import of the same
/// name. Failed imports are not cached.
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    /// Import the module described by `spec`
    async fn import_module(&self, spec: &ModuleSpec) -> Result<Arc<LoadedModule>, ImportError>;
}
