//! Waypoint Intro — one-shot reveal controllers.
//!
//! Both controllers fail open: reduced motion, a renderer failure, a timer
//! that cannot be scheduled or a safety timeout all end in "complete".

pub mod boot;
pub mod intro;

pub use boot::{BootSequence, BootTimings};
pub use intro::{IntroController, IntroStage, IntroTimings};
