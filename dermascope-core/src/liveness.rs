use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Shared flag tied to the lifetime of a view.
///
/// A view creates one on mount and cancels it on teardown; responses that
/// resolve afterwards are dropped instead of touching dead state.
#[derive(Debug, Clone)]
pub struct LiveFlag {
    alive: Arc<AtomicBool>,
}

impl LiveFlag {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn cancel(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Await `fut`, yielding `None` if the flag was cancelled meanwhile.
    pub async fn guard<T>(&self, fut: impl Future<Output = T>) -> Option<T> {
        let output = fut.await;
        if self.is_live() {
            Some(output)
        } else {
            debug!("Dropping response for a view that is gone");
            None
        }
    }

    /// Run a deferred action such as a timer callback only while the view is alive.
    pub fn run<F: FnOnce()>(&self, action: F) -> bool {
        if self.is_live() {
            action();
            true
        } else {
            debug!("Skipping deferred action for a view that is gone");
            false
        }
    }
}

impl Default for LiveFlag {
    fn default() -> Self {
        Self::new()
    }
}
