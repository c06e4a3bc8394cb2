//! Live-task accounting
//!
//! Every crawl task holds a [`TaskGuard`] for its whole lifetime. The guard
//! is taken by the parent before the child is spawned, so the counter can
//! never read zero while a spawned child is still pending.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Counter {
    active: AtomicUsize,
    idle: Notify,
}

/// Shared counter of running crawl tasks
#[derive(Debug, Clone, Default)]
pub struct TaskCounter {
    inner: Arc<Counter>,
}

/// Marks one live task; dropping it decrements the counter
#[derive(Debug)]
pub struct TaskGuard {
    inner: Arc<Counter>,
}

impl TaskCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task that is about to be spawned
    pub fn enter(&self) -> TaskGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of tasks that have not finished yet
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Waits until no task is running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Register interest before reading the counter so a wakeup
            // between the check and the await is not lost.
            notified.as_mut().enable();

            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
