//! File System Utilities
//!
//! Configuration and data directory management.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "dl-config", "dl-config-store").ok_or_else(|| Error::Invalid {
        message: "Could not determine project directories".to_string(),
    })
}

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}

/// Get or create the client's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/dl-config-store/` or `$XDG_CONFIG_HOME/dl-config-store/`
/// - **macOS**: `~/Library/Application Support/org.dl-config.dl-config-store/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\dl-config\dl-config-store\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    ensure_dir(project_dirs()?.config_dir())
}

/// Get or create the data directory for persisted UI toggles
///
/// Platform-specific locations:
/// - **Linux**: `~/.local/share/dl-config-store/`
/// - **macOS**: `~/Library/Application Support/org.dl-config.dl-config-store/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\dl-config\dl-config-store\data\`
pub fn get_or_create_data_dir() -> Result<PathBuf> {
    ensure_dir(project_dirs()?.data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("a").join("b");
        let created = ensure_dir(&nested).expect("create");
        assert!(created.is_dir());
        // second call is a no-op
        ensure_dir(&nested).expect("again");
    }
}
