//! Trailing-edge debouncer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use waypoint_core::error::NavigationError;

/// Coalesces rapid pushes into one call of the sink, made once no new value
/// has arrived for `delay`. The last value wins.
pub struct Debouncer<T> {
    delay: Duration,
    pending: Mutex<Option<AbortHandle>>,
    sink: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    /// Creates a debouncer that forwards settled values to `sink`.
    pub fn new<F>(delay: Duration, sink: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            pending: Mutex::new(None),
            sink: Arc::new(sink),
        }
    }

    /// The quiet period before a value is forwarded.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value with `value` and restarts the quiet period.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Scheduling` if no tokio runtime is available.
    pub fn push(&self, value: T) -> Result<(), NavigationError> {
        let runtime = Handle::try_current()
            .map_err(|e| NavigationError::Scheduling(format!("no timer runtime: {e}")))?;
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        let handle = runtime
            .spawn(async move {
                tokio::time::sleep(delay).await;
                sink(value);
            })
            .abort_handle();

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    /// Drops the pending value, if any.
    pub fn cancel(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }

    /// Whether a value is waiting for its quiet period to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
