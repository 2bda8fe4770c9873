//! Host ports for running without a browser: scrolls, fragments and
//! animation cues are logged instead of rendered.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};
use waypoint_core::animation::{AnimationCue, RevealAnimation};
use waypoint_core::error::NavigationError;
use waypoint_core::viewport::{MotionPreference, ScrollBehavior, Viewport, VisibilityObserver};

/// A viewport with every section laid out; remembers the last fragment.
#[derive(Debug, Default)]
pub struct HeadlessViewport {
    fragment: Mutex<Option<String>>,
}

impl HeadlessViewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current URL fragment, if any section has been scrolled to.
    #[must_use]
    pub fn fragment(&self) -> Option<String> {
        self.fragment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Viewport for HeadlessViewport {
    fn scroll_to(&self, section_id: &str, behavior: ScrollBehavior) -> Result<(), NavigationError> {
        info!(section_id, ?behavior, "scroll");
        Ok(())
    }

    fn replace_fragment(&self, section_id: &str) {
        *self.fragment.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(section_id.to_owned());
    }
}

/// Tracks which sections are observed. Visibility itself is reported by
/// the `visible` command.
#[derive(Debug, Default)]
pub struct HeadlessObserver {
    observed: Mutex<Vec<String>>,
}

impl HeadlessObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn observed(&self) -> Vec<String> {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl VisibilityObserver for HeadlessObserver {
    fn observe(&self, section_id: &str) {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(section_id.to_owned());
    }

    fn disconnect(&self) {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// A motion preference that can be flipped at runtime. Running controllers
/// are notified through [`MotionPreference::subscribe`].
#[derive(Debug)]
pub struct HeadlessMotion {
    reduced: watch::Sender<bool>,
}

impl Default for HeadlessMotion {
    fn default() -> Self {
        Self::new(false)
    }
}

impl HeadlessMotion {
    /// Starts with the given preference.
    #[must_use]
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced: watch::channel(reduced).0,
        }
    }

    /// Changes the preference and notifies subscribers.
    pub fn set_reduced(&self, reduced: bool) {
        self.reduced.send_replace(reduced);
        info!(reduced, "motion preference changed");
    }
}

impl MotionPreference for HeadlessMotion {
    fn prefers_reduced_motion(&self) -> bool {
        *self.reduced.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.reduced.subscribe()
    }
}

/// Logs each cue at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnimation;

impl RevealAnimation for TracingAnimation {
    fn play(&self, cue: AnimationCue) -> Result<(), NavigationError> {
        debug!(%cue, "reveal");
        Ok(())
    }
}
