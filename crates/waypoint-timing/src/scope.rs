//! Scoped timer ownership with guaranteed release.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use waypoint_core::error::NavigationError;

#[derive(Debug, Default)]
struct ScopeState {
    handles: Vec<AbortHandle>,
    closed: bool,
}

/// Owns every timer a controller schedules.
///
/// `cancel_all` aborts outstanding timers and leaves the scope usable;
/// `close` (also run on drop) aborts them and refuses new ones. Aborting a
/// timer that already fired is a no-op, so teardown is safe from any exit
/// path.
#[derive(Debug, Default)]
pub struct TimerScope {
    state: Mutex<ScopeState>,
}

impl TimerScope {
    /// Creates an empty, open scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `callback` once after `delay`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Scheduling` if the scope is closed or no
    /// tokio runtime is available.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> Result<(), NavigationError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        })
    }

    /// Runs `task` to completion unless the scope is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Scheduling` if the scope is closed or no
    /// tokio runtime is available.
    pub fn spawn<F>(&self, task: F) -> Result<(), NavigationError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return Err(NavigationError::Scheduling("timer scope is closed".into()));
        }
        let runtime = Handle::try_current()
            .map_err(|e| NavigationError::Scheduling(format!("no timer runtime: {e}")))?;
        state.handles.retain(|handle| !handle.is_finished());
        state.handles.push(runtime.spawn(task).abort_handle());
        Ok(())
    }

    /// Aborts every outstanding timer. The scope stays open.
    pub fn cancel_all(&self) {
        let handles = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut state.handles)
        };
        for handle in handles {
            handle.abort();
        }
    }

    /// Aborts every outstanding timer and refuses new ones.
    pub fn close(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed = true;
        self.cancel_all();
    }

    /// Whether the scope has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
    }

    /// Number of timers that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handles
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl Drop for TimerScope {
    fn drop(&mut self) {
        self.close();
    }
}
