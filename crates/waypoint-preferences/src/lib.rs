//! Waypoint Preferences — the durable "docked" flag and "last section"
//! record.
//!
//! Storage failures never reach callers: the store falls back to an
//! in-memory copy and keeps working for the rest of the session.

pub mod backends;
pub mod store;

pub use backends::{JsonFileStore, MemoryStore};
pub use store::{DOCKED_KEY, LAST_SECTION_KEY, LastSection, PersistedPreference, PreferenceStore};
