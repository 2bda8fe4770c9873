//! Waypoint Core — shared navigation vocabulary.
//!
//! This crate defines the phase and page-context types every other crate
//! speaks, plus the host ports (storage, viewport, motion preference,
//! animation renderer) that the browser or a headless driver implements.
//! It contains no timers and no I/O.

pub mod animation;
pub mod clock;
pub mod error;
pub mod location;
pub mod phase;
pub mod section;
pub mod store;
pub mod viewport;
