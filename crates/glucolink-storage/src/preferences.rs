//! JSON-file backed preference store.

use crate::StorageResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key/value preferences persisted to a single JSON object on disk.
///
/// Every mutation is written through immediately.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl PreferenceStore {
    /// Load preferences from `path`, starting empty if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Map::new()
        };

        debug!(path = %path.display(), entries = values.len(), "Loaded preferences");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a typed value. Missing keys and type mismatches yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a typed value or the provided default.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw JSON value for `key`.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a value and persist.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> StorageResult<()> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        self.save()
    }

    /// Delete a value and persist. Returns whether the key existed.
    pub fn delete(&mut self, key: &str) -> StorageResult<bool> {
        let existed = self.values.remove(key).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every value and persist.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.values.clear();
        self.save()
    }

    /// Write the current values to disk.
    pub fn save(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
