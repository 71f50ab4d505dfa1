//! File system paths for glucolink.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Preference file name, kept compatible with the desktop app's store.
const PREFERENCES_FILE_NAME: &str = "app-settings.json";

/// Manages file system paths for glucolink.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for local state (~/.glucolink)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.glucolink`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".glucolink"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.glucolink).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.glucolink/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the preferences file path (~/.glucolink/app-settings.json).
    pub fn preferences_file(&self) -> PathBuf {
        self.base_dir.join(PREFERENCES_FILE_NAME)
    }

    /// Get the logs directory (~/.glucolink/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_with_base_dir() {
        let base = PathBuf::from("/tmp/test-glucolink");
        let paths = Paths::with_base_dir(base.clone());

        assert_eq!(paths.base_dir(), &base);
        assert_eq!(paths.config_file(), base.join("config.json"));
        assert_eq!(paths.preferences_file(), base.join("app-settings.json"));
        assert_eq!(paths.logs_dir(), base.join("logs"));
    }

    #[test]
    fn test_paths_default() {
        let paths = Paths::new().unwrap();
        let home = dirs::home_dir().unwrap();

        assert_eq!(paths.base_dir(), &home.join(".glucolink"));
    }

    #[test]
    fn test_ensure_dirs_creates_directories() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("glucolink");
        let paths = Paths::with_base_dir(base.clone());

        assert!(!base.exists());
        assert!(!paths.logs_dir().exists());

        paths.ensure_dirs().unwrap();

        assert!(base.is_dir());
        assert!(paths.logs_dir().is_dir());
    }

    #[test]
    fn test_ensure_dirs_idempotent() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.logs_dir().exists());
    }

    #[test]
    fn test_paths_clone() {
        let paths = Paths::with_base_dir(PathBuf::from("/test/clone"));
        let cloned = paths.clone();

        assert_eq!(paths.base_dir(), cloned.base_dir());
        assert_eq!(paths.preferences_file(), cloned.preferences_file());
    }
}
