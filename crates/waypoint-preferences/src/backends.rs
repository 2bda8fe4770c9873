//! `KeyValueStore` backends.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use waypoint_core::error::NavigationError;
use waypoint_core::store::KeyValueStore;

/// Session-only storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, NavigationError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NavigationError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NavigationError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Durable storage in a single JSON object file.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash never leaves a half-written object behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, NavigationError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                NavigationError::Storage(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(NavigationError::Storage(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), NavigationError> {
        let storage_error =
            |e: std::io::Error| NavigationError::Storage(format!("{}: {e}", self.path.display()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| NavigationError::Serialization(e.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(storage_error)?;
        fs::rename(&staging, &self.path).map_err(storage_error)
    }

    fn update<F>(&self, edit: F) -> Result<(), NavigationError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read_all()?;
        edit(&mut values);
        self.write_all(&values)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, NavigationError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NavigationError> {
        self.update(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), NavigationError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        store.set("docked", "1").unwrap();
        let value = store.get("docked").unwrap();
        store.remove("docked").unwrap();

        assert_eq!(value.as_deref(), Some("1"));
        assert_eq!(store.get("docked").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_persists_across_instances() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        // Act
        JsonFileStore::new(&path).set("docked", "1").unwrap();
        let reopened = JsonFileStore::new(&path);

        // Assert
        assert_eq!(reopened.get("docked").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("lastSection").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get("docked").unwrap(), None);
        store.remove("docked").unwrap();
    }

    #[test]
    fn test_json_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "[1, 2").unwrap();

        let result = JsonFileStore::new(&path).get("docked");

        assert!(matches!(result, Err(NavigationError::Storage(_))));
    }
}
