//! Plugin loading across a set of roots

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use plugin_loader_api::{ModuleImporter, ModuleSpec, PluginId, PluginRegistrar, PluginType, Registration};

use crate::config::PluginRoots;
use crate::plugin::classifier::ModuleClassifier;
use crate::plugin::enumerator::{self, FsPackageSource, PackageSource};
use crate::plugin::importer::ManifestImporter;

/// Stage at which a candidate failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Enumerate,
    Import,
    Register,
}

/// A failure isolated to one root or candidate
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    /// Qualified module name, when the failure concerns a module
    pub module: Option<String>,

    /// Path involved
    pub origin: PathBuf,

    pub stage: FailureStage,

    pub message: String,
}

/// Outcome of one load pass
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Tier the pass ran for
    pub plugin_type: PluginType,

    /// Roots that were scanned
    pub scanned_roots: Vec<PathBuf>,

    /// Roots skipped because they are not existing directories
    pub skipped_roots: Vec<PathBuf>,

    /// Number of candidate packages seen
    pub candidates: usize,

    /// Candidates without an entry module for the tier
    pub unmatched: usize,

    /// Plugins newly registered
    pub registered: Vec<PluginId>,

    /// Plugins whose identity was already registered
    pub duplicates: Vec<PluginId>,

    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    fn new(plugin_type: PluginType) -> Self {
        Self {
            plugin_type,
            scanned_roots: Vec::new(),
            skipped_roots: Vec::new(),
            candidates: 0,
            unmatched: 0,
            registered: Vec::new(),
            duplicates: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether the pass finished without failures
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

static LOAD_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Lock held across import and registration of each candidate, shared by
/// every loader in the process
fn load_lock() -> &'static Mutex<()> {
    LOAD_LOCK.get_or_init(|| Mutex::new(()))
}

/// Discovers, imports and registers plugins found under plugin roots.
///
/// A missing root, a package without an entry module, or a module that
/// fails to import only affects that root or package; the pass always runs
/// to completion.
pub struct PluginLoader {
    source: Arc<dyn PackageSource>,
    classifier: ModuleClassifier,
    importer: Arc<dyn ModuleImporter>,
    registrar: Arc<dyn PluginRegistrar>,
}

impl PluginLoader {
    /// Loader over the local filesystem importing through the process-wide
    /// YAML module importer
    pub fn new(registrar: Arc<dyn PluginRegistrar>) -> Self {
        Self {
            source: Arc::new(FsPackageSource),
            classifier: ModuleClassifier::new(),
            importer: ManifestImporter::global(),
            registrar,
        }
    }

    /// Replace the filesystem view
    pub fn with_source(mut self, source: Arc<dyn PackageSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the module importer
    pub fn with_importer(mut self, importer: Arc<dyn ModuleImporter>) -> Self {
        self.importer = importer;
        self
    }

    /// Replace the naming conventions
    pub fn with_classifier(mut self, classifier: ModuleClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Load every plugin of `plugin_type` found under `roots`
    pub async fn load_plugins_from_roots<P: AsRef<Path>>(
        &self,
        roots: &[P],
        plugin_type: PluginType,
    ) -> LoadReport {
        let mut report = LoadReport::new(plugin_type);

        for root in roots {
            let root = root.as_ref();

            if !self.source.is_dir(root) {
                info!("Plugin root is not a directory, skipping: {:?}", root);
                report.skipped_roots.push(root.to_path_buf());
                continue;
            }

            info!("Scanning {} plugin root: {:?}", plugin_type, root);
            report.scanned_roots.push(root.to_path_buf());
            self.scan_root(root, plugin_type, &mut report).await;
        }

        info!(
            "Loaded {} plugins: {} registered, {} duplicates, {} failures",
            plugin_type,
            report.registered.len(),
            report.duplicates.len(),
            report.failures.len()
        );
        report
    }

    /// Run one load pass per tier, bootstrap first
    pub async fn load_phases(&self, roots: &PluginRoots) -> Vec<LoadReport> {
        let mut reports = Vec::with_capacity(PluginType::ALL.len());
        for plugin_type in PluginType::ALL {
            let report = self
                .load_plugins_from_roots(roots.for_type(plugin_type), plugin_type)
                .await;
            reports.push(report);
        }
        reports
    }

    async fn scan_root(&self, root: &Path, plugin_type: PluginType, report: &mut LoadReport) {
        let packages = match enumerator::enumerate_packages(self.source.as_ref(), root) {
            Ok(packages) => packages,
            Err(e) => {
                warn!("Failed to enumerate plugin root {:?}: {}", root, e);
                report.failures.push(LoadFailure {
                    module: None,
                    origin: root.to_path_buf(),
                    stage: FailureStage::Enumerate,
                    message: e.to_string(),
                });
                return;
            }
        };

        for candidate in &packages {
            report.candidates += 1;
            match self
                .classifier
                .classify(self.source.as_ref(), candidate, plugin_type)
            {
                Some(spec) => self.load_module(&spec, plugin_type, report).await,
                None => report.unmatched += 1,
            }
        }
    }

    async fn load_module(&self, spec: &ModuleSpec, plugin_type: PluginType, report: &mut LoadReport) {
        let _guard = load_lock().lock().await;

        let module = match self.importer.import_module(spec).await {
            Ok(module) => module,
            Err(e) => {
                warn!("Failed to import {}: {}", spec.name, e);
                report.failures.push(LoadFailure {
                    module: Some(spec.name.to_string()),
                    origin: spec.origin.clone(),
                    stage: FailureStage::Import,
                    message: e.to_string(),
                });
                return;
            }
        };

        match self.registrar.register_plugin(&module, plugin_type).await {
            Ok(Registration::Registered(id)) => report.registered.push(id),
            Ok(Registration::AlreadyRegistered(id)) => {
                debug!("Plugin {} from {} was already registered", id, spec.name);
                report.duplicates.push(id);
            }
            Err(e) => {
                warn!("Failed to register {}: {}", spec.name, e);
                report.failures.push(LoadFailure {
                    module: Some(spec.name.to_string()),
                    origin: spec.origin.clone(),
                    stage: FailureStage::Register,
                    message: e.to_string(),
                });
            }
        }
    }
}
