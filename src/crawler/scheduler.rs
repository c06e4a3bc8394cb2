//! Request scheduler
//!
//! A counting admission gate that bounds the number of in-flight HTTP
//! requests. Only the fetch phase of a task holds a slot; registration,
//! parsing, extraction and disk writes run outside the gate, so the number
//! of live tasks is unbounded while the number of concurrent requests is not.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Default number of parallel requests
pub const DEFAULT_CAPACITY: usize = 20;

/// A held request slot; dropping it returns the slot to the scheduler
#[derive(Debug)]
pub struct RequestSlot {
    _permit: OwnedSemaphorePermit,
}

/// Scheduler bounding concurrent fetches
#[derive(Debug, Clone)]
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Scheduler {
    /// Creates a scheduler admitting at most `capacity` concurrent fetches
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a slot is free and claims it
    ///
    /// The semaphore is never closed, so this only fails if that invariant
    /// is broken.
    pub async fn acquire(&self) -> Result<RequestSlot, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        Ok(RequestSlot { _permit: permit })
    }

    /// Maximum number of concurrent fetches
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
