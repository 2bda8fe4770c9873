//! Navigation error types.

use thiserror::Error;

use crate::phase::NavigationPhase;

/// Top-level error type for the navigation layer.
///
/// Nothing here is fatal to the page: callers either ignore the error
/// (invalid transitions), log it (missing sections) or fail open (animation
/// and scheduling failures).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// An orchestrator operation was invoked in a phase that does not accept it.
    #[error("{operation} is not valid in the {phase} phase")]
    InvalidTransition {
        /// The rejected operation.
        operation: &'static str,
        /// The phase the orchestrator was in.
        phase: NavigationPhase,
    },

    /// A section id is not present in the current registry.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// The durable key/value store is unavailable or full.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A reveal animation failed while running.
    #[error("animation error: {0}")]
    Animation(String),

    /// A timer could not be scheduled (no runtime, or its scope was torn down).
    #[error("scheduling error: {0}")]
    Scheduling(String),
}
