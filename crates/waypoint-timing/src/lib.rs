//! Waypoint Timing — the event-loop primitives behind every delay.
//!
//! Nothing in the navigation layer blocks. Every delay is a task sleeping on
//! `tokio::time`, owned by a [`TimerScope`] that cancels it on teardown. The
//! two "force forward progress" timeouts share [`arm_fail_open`]; a mid-sequence
//! switch to reduced motion is followed through [`arm_reduced_motion`].

pub mod debounce;
pub mod millis;
pub mod race;
pub mod scope;
pub mod sequencer;
pub mod signal;

pub use debounce::Debouncer;
pub use race::{Settled, arm_fail_open, arm_reduced_motion, race_with_timeout};
pub use scope::TimerScope;
pub use sequencer::TimedSequencer;
pub use signal::CompletionSignal;
