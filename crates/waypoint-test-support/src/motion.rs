//! Test motion preference.

use tokio::sync::watch;
use waypoint_core::viewport::MotionPreference;

/// A motion preference that can be flipped mid-test. Subscribers see every
/// flip.
#[derive(Debug)]
pub struct FixedMotion(watch::Sender<bool>);

impl Default for FixedMotion {
    fn default() -> Self {
        Self::allowed()
    }
}

impl FixedMotion {
    /// Motion allowed.
    #[must_use]
    pub fn allowed() -> Self {
        Self(watch::channel(false).0)
    }

    /// Reduced motion requested.
    #[must_use]
    pub fn reduced() -> Self {
        Self(watch::channel(true).0)
    }

    /// Changes the preference.
    pub fn set_reduced(&self, reduced: bool) {
        self.0.send_replace(reduced);
    }
}

impl MotionPreference for FixedMotion {
    fn prefers_reduced_motion(&self) -> bool {
        *self.0.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}
