//! Package enumeration under a plugin root

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::plugin::validator;
use crate::utils;

/// An entry found directly under a plugin root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePackage {
    /// Package name (the entry's file name)
    pub name: String,

    /// Root the package was found under
    pub root: PathBuf,

    /// Package path
    pub path: PathBuf,

    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Filesystem view used while scanning for plugins
pub trait PackageSource: Send + Sync {
    /// Whether `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate entries of `root`, sorted by name
    fn list_packages(&self, root: &Path) -> io::Result<Vec<CandidatePackage>>;

    /// Path of the module `module` directly inside `package`, if present.
    ///
    /// Looks up that one name only; the package is never listed.
    fn find_module(&self, package: &Path, module: &str) -> Option<PathBuf>;
}

/// [`PackageSource`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPackageSource;

impl PackageSource for FsPackageSource {
    fn is_dir(&self, path: &Path) -> bool {
        validator::is_loadable_root(path)
    }

    fn list_packages(&self, root: &Path) -> io::Result<Vec<CandidatePackage>> {
        let mut packages = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path().to_path_buf();
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };

            packages.push(CandidatePackage {
                name: name.to_string(),
                root: root.to_path_buf(),
                // Follows symlinks, unlike the walkdir file type
                is_dir: path.is_dir(),
                path,
            });
        }

        Ok(packages)
    }

    fn find_module(&self, package: &Path, module: &str) -> Option<PathBuf> {
        utils::MODULE_EXTENSIONS
            .iter()
            .map(|ext| package.join(format!("{module}.{ext}")))
            .find(|path| path.is_file())
    }
}

/// List the immediate sub-packages of a validated root.
///
/// Does not recurse. An empty root yields an empty list.
pub fn enumerate_packages(
    source: &dyn PackageSource,
    root: &Path,
) -> io::Result<Vec<CandidatePackage>> {
    let mut packages = source.list_packages(root)?;
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}
