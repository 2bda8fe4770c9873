//! Fail-open races between a success signal and a deadline, or a change of
//! motion preference.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use waypoint_core::error::NavigationError;

use crate::scope::TimerScope;
use crate::signal::CompletionSignal;

/// Which side of a race settled first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    /// The operation finished within the limit.
    Completed(T),
    /// The limit elapsed first.
    TimedOut,
}

impl<T> Settled<T> {
    /// Whether the deadline won.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Awaits `operation` for at most `limit`.
pub async fn race_with_timeout<F>(operation: F, limit: Duration) -> Settled<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(value) => Settled::Completed(value),
        Err(_) => Settled::TimedOut,
    }
}

/// Arms a safety net in `scope`: if `signal` has not completed within
/// `limit`, `on_timeout` runs exactly once.
///
/// The net is cancelled with the rest of the scope, and does nothing when the
/// signal wins the race.
///
/// # Errors
///
/// Returns `NavigationError::Scheduling` if the net cannot be scheduled; the
/// caller is expected to fail open immediately in that case.
pub fn arm_fail_open<F>(
    scope: &TimerScope,
    signal: &CompletionSignal,
    limit: Duration,
    label: &'static str,
    on_timeout: F,
) -> Result<(), NavigationError>
where
    F: FnOnce() + Send + 'static,
{
    let signal = signal.clone();
    scope.spawn(async move {
        if race_with_timeout(signal.wait(), limit).await.timed_out() {
            warn!(
                safety_net = label,
                limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "safety timeout fired; forcing forward progress"
            );
            on_timeout();
        }
    })
}

/// Watches the motion preference from inside `scope`: once `changes`
/// reports reduced motion, `on_reduced` runs exactly once.
///
/// A closed channel never fires. The watch is cancelled with the rest of the
/// scope.
///
/// # Errors
///
/// Returns `NavigationError::Scheduling` if the watch cannot be spawned.
pub fn arm_reduced_motion<F>(
    scope: &TimerScope,
    mut changes: watch::Receiver<bool>,
    label: &'static str,
    on_reduced: F,
) -> Result<(), NavigationError>
where
    F: FnOnce() + Send + 'static,
{
    scope.spawn(async move {
        if changes.wait_for(|reduced| *reduced).await.is_ok() {
            info!(sequence = label, "reduced motion requested mid-sequence; collapsing");
            on_reduced();
        }
    })
}
