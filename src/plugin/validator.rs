//! Root path validation

use std::path::Path;

/// Check whether `path` can be scanned for plugin packages.
///
/// Missing paths and non-directories are ordinary non-matches: this never
/// fails and never touches the directory contents.
pub fn is_loadable_root(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
