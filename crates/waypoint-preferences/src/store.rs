//! Preference store with in-memory degradation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use waypoint_core::error::NavigationError;
use waypoint_core::store::KeyValueStore;

/// Storage key for the docked flag; the value is `"1"` or absent.
pub const DOCKED_KEY: &str = "docked";

/// Storage key for the last visited section record.
pub const LAST_SECTION_KEY: &str = "lastSection";

/// The last section the reader settled on, offered back as "Continue".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSection {
    /// Section id.
    pub id: String,
    /// Section title at the time of the write.
    pub label: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

/// Everything persisted across reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedPreference {
    /// The reader has completed the intro (or docked by other means).
    pub docked: bool,
    /// The last section the reader settled on.
    pub last_section: Option<LastSection>,
}

impl PersistedPreference {
    /// Whether nothing was persisted, i.e. this is a first visit.
    #[must_use]
    pub fn is_first_visit(&self) -> bool {
        !self.docked
    }
}

/// Durable preference store.
///
/// Wraps a [`KeyValueStore`]; the first failing read or write switches the
/// store to non-persistent mode, after which values live only in memory.
/// The orchestrator owns [`DOCKED_KEY`] and the scroll-spy owns
/// [`LAST_SECTION_KEY`], so writers never contend for a key.
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
    fallback: Mutex<HashMap<String, String>>,
    degraded: AtomicBool,
}

impl PreferenceStore {
    /// Creates a store over `backend`.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            fallback: Mutex::new(HashMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether writes still reach durable storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        !self.degraded.load(Ordering::SeqCst)
    }

    /// Reads everything persisted.
    #[must_use]
    pub fn load(&self) -> PersistedPreference {
        PersistedPreference {
            docked: self.is_docked(),
            last_section: self.last_section(),
        }
    }

    /// Whether the docked flag is set.
    #[must_use]
    pub fn is_docked(&self) -> bool {
        self.read(DOCKED_KEY).is_some_and(|value| value == "1")
    }

    /// Sets or clears the docked flag.
    pub fn set_docked(&self, docked: bool) {
        if docked {
            self.write(DOCKED_KEY, Some("1"));
        } else {
            self.write(DOCKED_KEY, None);
        }
    }

    /// Reads the last section record. A corrupt record reads as absent.
    #[must_use]
    pub fn last_section(&self) -> Option<LastSection> {
        let raw = self.read(LAST_SECTION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "discarding unreadable lastSection record");
                None
            }
        }
    }

    /// Writes the last section record.
    pub fn record_last_section(&self, record: &LastSection) {
        match serde_json::to_string(record) {
            Ok(json) => {
                debug!(section_id = %record.id, "persisting last section");
                self.write(LAST_SECTION_KEY, Some(&json));
            }
            Err(e) => warn!(
                error = %NavigationError::Serialization(e.to_string()),
                "cannot encode lastSection record"
            ),
        }
    }

    /// Clears both keys, so the next load is treated as a first visit.
    pub fn forget(&self) {
        self.write(DOCKED_KEY, None);
        self.write(LAST_SECTION_KEY, None);
    }

    fn read(&self, key: &str) -> Option<String> {
        if !self.degraded.load(Ordering::SeqCst) {
            match self.backend.get(key) {
                Ok(value) => return value,
                Err(e) => self.degrade(key, &e),
            }
        }
        self.fallback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: Option<&str>) {
        {
            let mut fallback = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);
            match value {
                Some(v) => fallback.insert(key.to_owned(), v.to_owned()),
                None => fallback.remove(key),
            };
        }
        if self.degraded.load(Ordering::SeqCst) {
            return;
        }
        let result = match value {
            Some(v) => self.backend.set(key, v),
            None => self.backend.remove(key),
        };
        if let Err(e) = result {
            self.degrade(key, &e);
        }
    }

    fn degrade(&self, key: &str, error: &NavigationError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(key, %error, "preference storage unavailable; continuing in memory");
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}
