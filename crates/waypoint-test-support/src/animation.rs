//! Test renderers — `RevealAnimation` implementations for tests.

use std::sync::Mutex;

use waypoint_core::animation::{AnimationCue, RevealAnimation};
use waypoint_core::error::NavigationError;

/// A renderer that records every cue it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingAnimation {
    played: Mutex<Vec<AnimationCue>>,
}

impl RecordingAnimation {
    /// Creates a renderer with nothing played.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cues played so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn played(&self) -> Vec<AnimationCue> {
        self.played.lock().unwrap().clone()
    }
}

impl RevealAnimation for RecordingAnimation {
    fn play(&self, cue: AnimationCue) -> Result<(), NavigationError> {
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}

/// A renderer that crashes on one cue and plays every other cue.
#[derive(Debug)]
pub struct FailingAnimation {
    fails_on: AnimationCue,
}

impl FailingAnimation {
    /// Creates a renderer that fails when asked to play `cue`.
    #[must_use]
    pub fn on(cue: AnimationCue) -> Self {
        Self { fails_on: cue }
    }
}

impl RevealAnimation for FailingAnimation {
    fn play(&self, cue: AnimationCue) -> Result<(), NavigationError> {
        if cue == self.fails_on {
            return Err(NavigationError::Animation(format!("renderer crashed on {cue}")));
        }
        Ok(())
    }
}
