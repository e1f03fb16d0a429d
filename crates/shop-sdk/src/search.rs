//! Debounced search input.
//!
//! For embedders that feed keystrokes into a search box. The `shop` binary
//! runs one search per invocation and calls the product store directly.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet period before a search runs.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Runs only the last of a burst of searches.
///
/// Each [`trigger`](Self::trigger) restarts the timer; the search runs once
/// no new trigger has arrived for the whole delay.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `search`, dropping whatever was scheduled before. Must be
    /// called inside a Tokio runtime.
    pub fn trigger<F, Fut>(&self, search: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            search().await;
        });
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Drop the scheduled search, if any.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Whether a search is scheduled and has not finished.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
