//! Capabilities the loader depends on

pub mod importer;
pub mod registrar;

// Re-export main types for convenience
pub use importer::*;
pub use registrar::*;
