use async_trait::async_trait;
use plugin_loader::plugin::{
    CandidatePackage, FailureStage, FsPackageSource, ImportError, LoadedModule, ModuleImporter,
    ModuleSpec, PackageSource, PluginDescriptor, PluginLoader, PluginRegistrar, PluginRegistry,
    PluginType, Registration, RegistrationError,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Filesystem view recording which directories were listed and which
/// module names were looked up
#[derive(Default)]
struct RecordingSource {
    packages_listed: Mutex<Vec<PathBuf>>,
    modules_looked_up: Mutex<Vec<(PathBuf, String)>>,
}

impl PackageSource for RecordingSource {
    fn is_dir(&self, path: &Path) -> bool {
        FsPackageSource.is_dir(path)
    }

    fn list_packages(&self, root: &Path) -> io::Result<Vec<CandidatePackage>> {
        self.packages_listed.lock().unwrap().push(root.to_path_buf());
        FsPackageSource.list_packages(root)
    }

    fn find_module(&self, package: &Path, module: &str) -> Option<PathBuf> {
        self.modules_looked_up
            .lock()
            .unwrap()
            .push((package.to_path_buf(), module.to_string()));
        FsPackageSource.find_module(package, module)
    }
}

/// Importer recording requested names without evaluating anything
#[derive(Default)]
struct RecordingImporter {
    imported: Mutex<Vec<String>>,
}

#[async_trait]
impl ModuleImporter for RecordingImporter {
    async fn import_module(&self, spec: &ModuleSpec) -> Result<Arc<LoadedModule>, ImportError> {
        self.imported.lock().unwrap().push(spec.name.to_string());
        let descriptor = PluginDescriptor::new(spec.name.package());
        Ok(Arc::new(LoadedModule::new(spec, descriptor)))
    }
}

/// Registrar recording calls before delegating to a real registry
#[derive(Default)]
struct RecordingRegistrar {
    calls: Mutex<Vec<(String, PluginType)>>,
    registry: PluginRegistry,
}

#[async_trait]
impl PluginRegistrar for RecordingRegistrar {
    async fn register_plugin(
        &self,
        module: &LoadedModule,
        plugin_type: PluginType,
    ) -> Result<Registration, RegistrationError> {
        self.calls
            .lock()
            .unwrap()
            .push((module.name.to_string(), plugin_type));
        self.registry.register_plugin(module, plugin_type).await
    }
}

struct Harness {
    source: Arc<RecordingSource>,
    importer: Arc<RecordingImporter>,
    registrar: Arc<RecordingRegistrar>,
    loader: PluginLoader,
}

fn harness() -> Harness {
    let source = Arc::new(RecordingSource::default());
    let importer = Arc::new(RecordingImporter::default());
    let registrar = Arc::new(RecordingRegistrar::default());
    let loader = PluginLoader::new(registrar.clone())
        .with_source(source.clone())
        .with_importer(importer.clone());

    Harness {
        source,
        importer,
        registrar,
        loader,
    }
}

fn write_module(root: &Path, package: &str, module: &str) {
    let dir = root.join(package);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{module}.yaml")), "").unwrap();
}

#[tokio::test]
async fn test_load_bootstrap_plugin() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("test_system_plugin");
    write_module(&root, "system_plugin", "sys_module");

    let h = harness();
    h.loader
        .load_plugins_from_roots(&[root], PluginType::Bootstrap)
        .await;

    assert_eq!(
        *h.importer.imported.lock().unwrap(),
        vec!["system_plugin.sys_module".to_string()]
    );
}

#[tokio::test]
async fn test_load_system_plugin() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("test_plugin");
    write_module(&root, "simple_plugin", "test_module");

    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots(&[root], PluginType::System)
        .await;

    assert_eq!(
        *h.importer.imported.lock().unwrap(),
        vec!["simple_plugin.test_module".to_string()]
    );
    assert_eq!(
        *h.registrar.calls.lock().unwrap(),
        vec![("simple_plugin.test_module".to_string(), PluginType::System)]
    );
    assert_eq!(report.registered, vec!["simple_plugin".to_string()]);
}

#[tokio::test]
async fn test_root_that_is_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("test_not_load_plugin");
    fs::write(&root, "a file, not a plugin root").unwrap();
    let missing = temp_dir.path().join("missing");

    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots(&[root.clone(), missing.clone()], PluginType::System)
        .await;

    assert!(h.source.packages_listed.lock().unwrap().is_empty());
    assert!(h.source.modules_looked_up.lock().unwrap().is_empty());
    assert!(h.importer.imported.lock().unwrap().is_empty());
    assert!(h.registrar.calls.lock().unwrap().is_empty());
    assert_eq!(report.skipped_roots, vec![root, missing]);
}

#[tokio::test]
async fn test_rejected_packages_are_not_opened() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("test_load_test_module");
    fs::create_dir_all(&root).unwrap();
    // A module file sitting directly in the root is not a package
    fs::write(root.join("test_module.yaml"), "").unwrap();
    write_module(&root, "_private_plugin", "test_module");
    write_module(&root, "not-a-package", "test_module");

    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots(&[root.clone()], PluginType::System)
        .await;

    assert_eq!(*h.source.packages_listed.lock().unwrap(), vec![root]);
    assert!(h.source.modules_looked_up.lock().unwrap().is_empty());
    assert!(h.registrar.calls.lock().unwrap().is_empty());
    assert_eq!(report.candidates, 3);
    assert_eq!(report.unmatched, 3);
}

#[tokio::test]
async fn test_package_without_entry_module() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    write_module(&root, "simple_plugin", "helpers");

    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots(&[root.clone()], PluginType::System)
        .await;

    // Only the entry module names are looked up; the package is never listed
    let package = root.join("simple_plugin");
    assert_eq!(
        *h.source.modules_looked_up.lock().unwrap(),
        vec![
            (package.clone(), "plugin_module".to_string()),
            (package, "test_module".to_string()),
        ]
    );
    assert!(h.importer.imported.lock().unwrap().is_empty());
    assert!(h.registrar.calls.lock().unwrap().is_empty());
    assert_eq!(report.unmatched, 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_package_for_another_tier_is_not_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    write_module(&root, "simple_plugin", "test_module");

    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots(&[root.clone()], PluginType::Bootstrap)
        .await;

    assert_eq!(
        *h.source.modules_looked_up.lock().unwrap(),
        vec![(root.join("simple_plugin"), "sys_module".to_string())]
    );
    assert!(h.importer.imported.lock().unwrap().is_empty());
    assert_eq!(report.unmatched, 1);
}

#[tokio::test]
async fn test_empty_root_list() {
    let h = harness();
    let report = h
        .loader
        .load_plugins_from_roots::<PathBuf>(&[], PluginType::System)
        .await;

    assert!(h.importer.imported.lock().unwrap().is_empty());
    assert!(h.registrar.calls.lock().unwrap().is_empty());
    assert!(report.scanned_roots.is_empty());
    assert!(report.skipped_roots.is_empty());
}

#[tokio::test]
async fn test_repeated_load_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    write_module(&root, "alpha_plugin", "test_module");
    write_module(&root, "beta_plugin", "plugin_module");

    let registry = Arc::new(PluginRegistry::new());
    let loader = PluginLoader::new(registry.clone());

    let first = loader
        .load_plugins_from_roots(&[root.clone()], PluginType::System)
        .await;
    let second = loader
        .load_plugins_from_roots(&[root], PluginType::System)
        .await;

    assert_eq!(first.registered.len(), 2);
    assert!(first.duplicates.is_empty());
    assert!(second.registered.is_empty());
    assert_eq!(
        second.duplicates,
        vec!["alpha_plugin".to_string(), "beta_plugin".to_string()]
    );
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn test_same_identity_across_roots() {
    let temp_dir = TempDir::new().unwrap();
    let first_root = temp_dir.path().join("first");
    let second_root = temp_dir.path().join("second");
    write_module(&first_root, "shared_plugin", "test_module");
    write_module(&second_root, "shared_plugin", "test_module");

    let registry = Arc::new(PluginRegistry::new());
    let report = PluginLoader::new(registry.clone())
        .load_plugins_from_roots(&[first_root.clone(), second_root], PluginType::System)
        .await;

    // The module name is already imported, so the second root resolves to
    // the cached module and its plugin is coalesced.
    assert_eq!(report.registered, vec!["shared_plugin".to_string()]);
    assert_eq!(report.duplicates, vec!["shared_plugin".to_string()]);

    let entry = registry.get("shared_plugin").await.unwrap();
    assert_eq!(
        entry.origin,
        first_root.join("shared_plugin").join("test_module.yaml")
    );
}

#[tokio::test]
async fn test_concurrent_loads_share_one_registry() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    for i in 0..8 {
        write_module(&root, &format!("plugin_{i}"), "test_module");
    }

    let registry = Arc::new(PluginRegistry::new());
    let loader = Arc::new(PluginLoader::new(registry.clone()));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let loader = Arc::clone(&loader);
        let root = root.clone();
        handles.push(tokio::spawn(async move {
            loader
                .load_plugins_from_roots(&[root], PluginType::System)
                .await
        }));
    }

    let mut registered = 0;
    let mut duplicates = 0;
    for handle in handles {
        let report = handle.await.unwrap();
        assert!(report.is_clean());
        registered += report.registered.len();
        duplicates += report.duplicates.len();
    }

    assert_eq!(registered, 8);
    assert_eq!(duplicates, 24);
    assert_eq!(registry.len().await, 8);
}

#[tokio::test]
async fn test_module_evaluated_once_across_loaders() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let package = root.join("shared_once_plugin");
    fs::create_dir_all(&package).unwrap();
    let origin = package.join("test_module.yaml");
    fs::write(&origin, "plugin:\n  id: first\n").unwrap();

    let registry = Arc::new(PluginRegistry::new());
    let first = PluginLoader::new(registry.clone())
        .load_plugins_from_roots(&[root.clone()], PluginType::System)
        .await;
    assert_eq!(first.registered, vec!["first".to_string()]);

    // A second loader in the same process reuses the imported module
    fs::write(&origin, "plugin: [broken").unwrap();
    let second = PluginLoader::new(registry.clone())
        .load_plugins_from_roots(&[root], PluginType::System)
        .await;

    assert!(second.is_clean());
    assert_eq!(second.duplicates, vec!["first".to_string()]);
    assert_eq!(registry.len().await, 1);
}

/// Registrar refusing plugins from one package
struct RejectingRegistrar {
    package: &'static str,
    registry: PluginRegistry,
}

#[async_trait]
impl PluginRegistrar for RejectingRegistrar {
    async fn register_plugin(
        &self,
        module: &LoadedModule,
        plugin_type: PluginType,
    ) -> Result<Registration, RegistrationError> {
        if module.name.package() == self.package {
            return Err(RegistrationError::Rejected {
                module: module.name.clone(),
                reason: "plugin is disabled".to_string(),
            });
        }
        self.registry.register_plugin(module, plugin_type).await
    }
}

#[tokio::test]
async fn test_registration_failure_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    write_module(&root, "a_disabled_plugin", "test_module");
    write_module(&root, "b_enabled_plugin", "test_module");

    let registrar = Arc::new(RejectingRegistrar {
        package: "a_disabled_plugin",
        registry: PluginRegistry::new(),
    });
    let report = PluginLoader::new(registrar.clone())
        .load_plugins_from_roots(&[root.clone()], PluginType::System)
        .await;

    assert_eq!(report.registered, vec!["b_enabled_plugin".to_string()]);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.stage, FailureStage::Register);
    assert_eq!(failure.module.as_deref(), Some("a_disabled_plugin.test_module"));
    assert_eq!(
        failure.origin,
        root.join("a_disabled_plugin").join("test_module.yaml")
    );
    assert!(failure.message.contains("plugin is disabled"));

    assert!(!registrar.registry.contains("a_disabled_plugin").await);
    assert!(registrar.registry.contains("b_enabled_plugin").await);
}
