//! Errors surfaced by the import and registration capabilities

use std::path::PathBuf;

use crate::types::{PluginId, QualifiedName};

/// Module import failure
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// No module file exists for the name
    #[error("module {name} not found at {origin:?}")]
    NotFound { name: QualifiedName, origin: PathBuf },

    /// The module exists but failed while being evaluated
    #[error("module {name} failed to initialize: {reason}")]
    Initialization { name: QualifiedName, reason: String },
}

impl ImportError {
    /// Qualified name of the module that failed
    pub fn module(&self) -> &QualifiedName {
        match self {
            ImportError::NotFound { name, .. } => name,
            ImportError::Initialization { name, .. } => name,
        }
    }
}

/// Registration failure
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("module {module} exports an invalid plugin id: {id:?}")]
    InvalidIdentity { module: QualifiedName, id: PluginId },

    /// Registrar-specific failure
    #[error("registration of {module} failed: {reason}")]
    Rejected { module: QualifiedName, reason: String },
}
