//! Durable key/value storage port.

use crate::error::NavigationError;

/// String key/value storage that survives reloads (browser local storage,
/// a file on disk, ...).
///
/// Implementations report unavailability and quota problems as
/// [`NavigationError::Storage`]; callers decide how to degrade.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Storage` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, NavigationError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Storage` if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), NavigationError>;

    /// Removes a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Storage` if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), NavigationError>;
}
