//! Idempotent one-shot completion signal.

use std::sync::Arc;

use tokio::sync::watch;

/// A one-shot "finished" flag that any number of tasks can await.
///
/// Completing twice is harmless: only the first call reports `true`.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CompletionSignal {
    /// Creates an incomplete signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Marks the signal complete. Returns `true` only for the first call.
    pub fn complete(&self) -> bool {
        self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    /// Whether the signal has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal completes (immediately if it already has).
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_complete_is_idempotent() {
        let signal = CompletionSignal::new();

        assert!(signal.complete());
        assert!(!signal.complete());
        assert!(signal.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_resolves_after_complete_from_another_task() {
        let signal = CompletionSignal::new();
        let completer = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            completer.complete();
        });

        signal.wait().await;

        assert!(signal.is_complete());
    }

    #[tokio::test]
    async fn test_wait_on_completed_signal_returns_immediately() {
        let signal = CompletionSignal::new();
        signal.complete();

        signal.wait().await;

        assert!(signal.is_complete());
    }
}
