//! Viewport ports: scrolling, visibility observation and motion preference.

use tokio::sync::watch;

use crate::error::NavigationError;

/// How a programmatic scroll should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animated scroll.
    Smooth,
    /// Jump without motion.
    Instant,
}

/// The scrollable document.
pub trait Viewport: Send + Sync {
    /// Scrolls the element anchored at `section_id` into the active position.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::SectionNotFound` if no element carries the id.
    fn scroll_to(&self, section_id: &str, behavior: ScrollBehavior) -> Result<(), NavigationError>;

    /// Rewrites the shareable URL fragment without creating a history entry.
    fn replace_fragment(&self, section_id: &str);
}

/// Registers elements with the host's visibility observer.
///
/// The host reports observations back as batches; see the scroll-spy.
pub trait VisibilityObserver: Send + Sync {
    /// Starts observing the element anchored at `section_id`.
    fn observe(&self, section_id: &str);

    /// Stops observing every element.
    fn disconnect(&self);
}

/// The user's motion preference. Read when a controller starts; running
/// controllers also follow [`subscribe`](Self::subscribe) and collapse to
/// their end state as soon as reduced motion is requested.
pub trait MotionPreference: Send + Sync {
    /// Whether reduced motion is requested.
    fn prefers_reduced_motion(&self) -> bool;

    /// Receives the preference after every change.
    ///
    /// The default never reports a change: its sender is already closed.
    fn subscribe(&self) -> watch::Receiver<bool> {
        watch::channel(self.prefers_reduced_motion()).1
    }
}
