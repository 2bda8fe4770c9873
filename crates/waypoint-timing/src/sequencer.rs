//! Cancellable chains of delayed steps.

use std::time::Duration;

use tracing::{debug, warn};
use waypoint_core::error::NavigationError;

use crate::scope::TimerScope;

type StepAction = Box<dyn FnOnce() -> Result<(), NavigationError> + Send>;

struct Step {
    delay: Duration,
    name: &'static str,
    action: StepAction,
}

/// A chain of steps, each run `delay` after the previous one.
///
/// The chain runs as one task inside a [`TimerScope`], so cancelling the
/// scope stops every remaining step. A failing step stops the chain and hands
/// its error to the failure callback.
pub struct TimedSequencer {
    label: &'static str,
    steps: Vec<Step>,
}

impl TimedSequencer {
    /// Creates an empty sequence; `label` names it in logs.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    /// Appends a step that runs `delay` after the previous step.
    #[must_use]
    pub fn then<F>(mut self, delay: Duration, name: &'static str, action: F) -> Self
    where
        F: FnOnce() -> Result<(), NavigationError> + Send + 'static,
    {
        self.steps.push(Step {
            delay,
            name,
            action: Box::new(action),
        });
        self
    }

    /// Sum of every step delay.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|step| step.delay).sum()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Starts the chain inside `scope`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Scheduling` if the chain cannot be scheduled.
    /// `on_failure` is not called in that case; the caller handles it.
    pub fn start<F>(self, scope: &TimerScope, on_failure: F) -> Result<(), NavigationError>
    where
        F: FnOnce(NavigationError) + Send + 'static,
    {
        let label = self.label;
        let steps = self.steps;
        scope.spawn(async move {
            for step in steps {
                tokio::time::sleep(step.delay).await;
                debug!(sequence = label, step = step.name, "running sequence step");
                if let Err(error) = (step.action)() {
                    warn!(sequence = label, step = step.name, %error, "sequence step failed");
                    on_failure(error);
                    return;
                }
            }
        })
    }
}

impl std::fmt::Debug for TimedSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedSequencer")
            .field("label", &self.label)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
