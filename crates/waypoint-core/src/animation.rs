//! Reveal animation port.

use std::fmt;

use crate::error::NavigationError;

/// A visual cue the intro or boot sequence asks the renderer to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCue {
    /// Draw the intro grid lines.
    GridLines,
    /// Reveal the intro title.
    Title,
    /// Type the boot line at this index.
    BootLine(usize),
}

impl fmt::Display for AnimationCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridLines => f.write_str("grid_lines"),
            Self::Title => f.write_str("title"),
            Self::BootLine(index) => write!(f, "boot_line[{index}]"),
        }
    }
}

/// Renders reveal animations. Rendering itself is outside this workspace;
/// controllers only sequence the cues and treat failures as completion.
pub trait RevealAnimation: Send + Sync {
    /// Plays a cue.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Animation` if the renderer fails.
    fn play(&self, cue: AnimationCue) -> Result<(), NavigationError>;
}

/// A renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimation;

impl RevealAnimation for NoopAnimation {
    fn play(&self, _cue: AnimationCue) -> Result<(), NavigationError> {
        Ok(())
    }
}
