//! Test stores — fake `KeyValueStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use waypoint_core::error::NavigationError;
use waypoint_core::store::KeyValueStore;

/// A working in-memory store that records every write.
///
/// Each entry of [`RecordingStore::writes`] is `(key, Some(value))` for a
/// `set` and `(key, None)` for a `remove`.
#[derive(Debug, Default)]
pub struct RecordingStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`, without recording them.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        store.values.lock().unwrap().extend(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned())),
        );
        store
    }

    /// Returns the current value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Returns a snapshot of all recorded writes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, Option<String>)> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns the recorded writes to one key.
    #[must_use]
    pub fn writes_to(&self, key: &str) -> Vec<Option<String>> {
        self.writes()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, NavigationError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NavigationError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self.writes
            .lock()
            .unwrap()
            .push((key.to_owned(), Some(value.to_owned())));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NavigationError> {
        self.values.lock().unwrap().remove(key);
        self.writes.lock().unwrap().push((key.to_owned(), None));
        Ok(())
    }
}

/// A store that fails every operation, like browser storage in a locked-down
/// private window.
#[derive(Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, NavigationError> {
        Err(NavigationError::Storage("storage unavailable".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), NavigationError> {
        Err(NavigationError::Storage("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), NavigationError> {
        Err(NavigationError::Storage("storage unavailable".into()))
    }
}
