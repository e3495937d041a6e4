//! Utility functions for plugin-loader

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions an entry module may carry
pub const MODULE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Ensure the parent directory of a file exists, creating it if necessary
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            } else if !parent.is_dir() {
                return Err(anyhow!("Path exists but is not a directory: {:?}", parent));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Get the XDG config directory for plugin-loader
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("plugin-loader");

    Ok(config_dir)
}

/// Expand `~` and environment variables in a root path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::full(&path_str)
        .map_err(|e| anyhow!("Failed to expand {:?}: {}", path, e))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Check whether `name` is usable as a package or module identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Format duration as human readable string
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs > 0 {
        format!("{secs}.{millis:03}s")
    } else {
        format!("{millis}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("system_plugin"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("plugin2"));
        assert!(!is_identifier("2plugin"));
        assert!(!is_identifier("my-plugin"));
        assert!(!is_identifier(".hidden"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_expand_path() {
        std::env::set_var("PLUGIN_LOADER_TEST_ROOT", "/opt/plugins");
        let expanded = expand_path(Path::new("$PLUGIN_LOADER_TEST_ROOT/system")).unwrap();
        assert_eq!(expanded, PathBuf::from("/opt/plugins/system"));

        let plain = expand_path(Path::new("./plugins")).unwrap();
        assert_eq!(plain, PathBuf::from("./plugins"));
    }

    #[test]
    fn test_ensure_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested").join("config.yaml");

        ensure_parent_directory(&file).unwrap();
        assert!(temp_dir.path().join("nested").is_dir());

        ensure_parent_directory(Path::new("config.yaml")).unwrap();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(std::time::Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(std::time::Duration::from_millis(1500)), "1.500s");
    }
}
