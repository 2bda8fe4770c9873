//! Waypoint Orchestrator — sequences the landing page from intro to docked
//! navigation.
//!
//! The phase lives on one [`PhaseOrchestrator`] instance owned by the page
//! shell and handed to views through a [`NavigationContext`]. Views never
//! change the phase themselves; they call back into the orchestrator's
//! operations, which consult a single transition table.

pub mod context;
pub mod orchestrator;
pub mod transition;
pub mod views;

pub use context::{NavigationContext, SelectOutcome};
pub use orchestrator::{NavigationSnapshot, OrchestratorTimings, PhaseOrchestrator, initial_phase};
pub use transition::{NavigationCommand, next_phase};
pub use views::{MenuKind, MenuView};
