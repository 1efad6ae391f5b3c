//! Trailing-edge debouncing.

use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Runs the most recent action once calls have paused for `delay`.
///
/// Each call cancels the timer of the previous one. Must be used from
/// within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, superseding any action still waiting.
    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = pending.replace(token.clone()) {
                previous.cancel();
            }
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("Debounced action superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    action();
                }
            }
        });
    }

    /// Drop the waiting action, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
