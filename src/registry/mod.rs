//! Resource registry
//!
//! The registry maps every distinct URL string seen during a run to exactly
//! one [`Resource`]. Registration is an atomic insert-if-absent: of all the
//! tasks that race to register the same URL, exactly one is told it created
//! the resource and only that task may process it.

mod resource;

pub use resource::{Resource, ResourceSnapshot};

use crate::url::{hostname, is_foreign, is_processable_scheme};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// Locks a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Concurrency-safe set of all resources of a run
#[derive(Debug)]
pub struct Registry {
    seed_host: String,
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_url: HashMap<String, Arc<Resource>>,
    ordered: Vec<Arc<Resource>>,
}

impl Registry {
    /// Creates an empty registry for a crawl rooted at `seed`
    pub fn new(seed: &Url) -> Self {
        Self::with_seed_host(hostname(seed))
    }

    /// Creates an empty registry comparing hosts against `seed_host`
    pub fn with_seed_host(seed_host: impl Into<String>) -> Self {
        Self {
            seed_host: seed_host.into(),
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Hostname that separates local resources from foreign ones
    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    /// Returns the resource for `url`, creating it if this is the first sighting
    ///
    /// The boolean is true only for the caller that created the resource.
    /// Callers that get `false` must not process the resource.
    pub fn register_or_get(&self, url: Url) -> (Arc<Resource>, bool) {
        let key = url.as_str().to_string();

        let mut inner = lock_unpoisoned(&self.inner);
        if let Some(existing) = inner.by_url.get(&key) {
            return (Arc::clone(existing), false);
        }

        let resource = Arc::new(Resource::new(
            url.clone(),
            is_foreign(&self.seed_host, &url),
            is_processable_scheme(&url),
        ));
        inner.ordered.push(Arc::clone(&resource));
        inner.by_url.insert(key, Arc::clone(&resource));

        (resource, true)
    }

    /// Looks up a resource by its exact URL string
    pub fn get(&self, url: &str) -> Option<Arc<Resource>> {
        lock_unpoisoned(&self.inner).by_url.get(url).cloned()
    }

    /// Returns a stable copy of all resources in registration order
    ///
    /// Resources are shared, so later state changes stay visible through
    /// the snapshot; the sequence itself does not grow.
    pub fn snapshot(&self) -> Vec<Arc<Resource>> {
        lock_unpoisoned(&self.inner).ordered.clone()
    }

    /// Number of registered resources
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.inner).ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
