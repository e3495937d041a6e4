//! Plugin discovery and loading
//!
//! A load pass walks each root directory, treats every immediate
//! subdirectory as a candidate package, resolves the package's entry module
//! for the requested [`PluginType`], imports it and registers the plugin it
//! exports.
//!
//! ```text
//! <root>/
//!   system_plugin/
//!     sys_module.yaml      bootstrap entry module
//!   simple_plugin/
//!     test_module.yaml     system/user entry module
//! ```

pub mod classifier;
pub mod enumerator;
pub mod importer;
pub mod loader;
pub mod registry;
pub mod validator;

pub use classifier::{DiscoveryStrategy, ModuleClassifier};
pub use enumerator::{enumerate_packages, CandidatePackage, FsPackageSource, PackageSource};
pub use importer::{ManifestImporter, ModuleManifest, PluginExport};
pub use loader::{FailureStage, LoadFailure, LoadReport, PluginLoader};
pub use registry::{PluginRegistry, RegistryEntry};
pub use validator::is_loadable_root;

pub use plugin_loader_api::{
    ImportError, LoadedModule, ModuleImporter, ModuleSpec, PluginDescriptor, PluginId,
    PluginRegistrar, PluginType, QualifiedName, Registration, RegistrationError,
};
