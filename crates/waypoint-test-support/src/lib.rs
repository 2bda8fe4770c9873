//! Shared test fakes for the Waypoint navigation layer.

mod animation;
mod clock;
mod motion;
mod store;
mod viewport;

pub use animation::{FailingAnimation, RecordingAnimation};
pub use clock::{FixedClock, fixed_clock};
pub use motion::FixedMotion;
pub use store::{FailingStore, RecordingStore};
pub use viewport::{RecordingObserver, RecordingViewport};
