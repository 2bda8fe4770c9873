//! Test viewport and observer — recording implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use waypoint_core::error::NavigationError;
use waypoint_core::viewport::{ScrollBehavior, Viewport, VisibilityObserver};

/// A viewport that records scrolls and fragment rewrites.
///
/// Scrolling to an id outside `known_ids` fails with `SectionNotFound`; an
/// empty `known_ids` accepts every id.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    known_ids: HashSet<String>,
    scrolls: Mutex<Vec<(String, ScrollBehavior)>>,
    fragments: Mutex<Vec<String>>,
}

impl RecordingViewport {
    /// A viewport that accepts every id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A viewport whose document only contains `ids`.
    #[must_use]
    pub fn with_elements(ids: &[&str]) -> Self {
        Self {
            known_ids: ids.iter().map(|id| (*id).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Returns the recorded scroll calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn scrolls(&self) -> Vec<(String, ScrollBehavior)> {
        self.scrolls.lock().unwrap().clone()
    }

    /// Returns the recorded fragment rewrites.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        self.fragments.lock().unwrap().clone()
    }
}

impl Viewport for RecordingViewport {
    fn scroll_to(&self, section_id: &str, behavior: ScrollBehavior) -> Result<(), NavigationError> {
        if !self.known_ids.is_empty() && !self.known_ids.contains(section_id) {
            return Err(NavigationError::SectionNotFound(section_id.to_owned()));
        }
        self.scrolls
            .lock()
            .unwrap()
            .push((section_id.to_owned(), behavior));
        Ok(())
    }

    fn replace_fragment(&self, section_id: &str) {
        self.fragments.lock().unwrap().push(section_id.to_owned());
    }
}

/// An observer that records which ids are observed.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    observed: Mutex<Vec<String>>,
    disconnects: Mutex<usize>,
}

impl RecordingObserver {
    /// Creates an observer with nothing observed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently under observation, in registration order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn observed(&self) -> Vec<String> {
        self.observed.lock().unwrap().clone()
    }

    /// How many times `disconnect` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn disconnects(&self) -> usize {
        *self.disconnects.lock().unwrap()
    }
}

impl VisibilityObserver for RecordingObserver {
    fn observe(&self, section_id: &str) {
        self.observed.lock().unwrap().push(section_id.to_owned());
    }

    fn disconnect(&self) {
        self.observed.lock().unwrap().clear();
        *self.disconnects.lock().unwrap() += 1;
    }
}
