use crate::state::ResourceState;
use serde::Serialize;
use std::sync::Mutex;
use url::Url;

use super::lock_unpoisoned;

/// The registry's record for one distinct URL seen during a run
///
/// The URL and the two classification flags are fixed at creation. All other
/// fields sit behind the resource's own lock, which is never held together
/// with the registry lock.
#[derive(Debug)]
pub struct Resource {
    url: Url,
    is_external: bool,
    is_interesting: bool,
    inner: Mutex<ResourceInner>,
}

#[derive(Debug, Default)]
struct ResourceInner {
    state: ResourceState,
    mime: Option<String>,
    size: u64,
    error: Option<String>,
    read_error: Option<String>,
    repeats: u32,
}

/// Point-in-time copy of a resource's fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSnapshot {
    pub url: String,
    pub state: ResourceState,
    pub mime: Option<String>,
    pub size: u64,
    pub is_external: bool,
    pub is_interesting: bool,
    pub error: Option<String>,
    pub read_error: Option<String>,
    pub repeats: u32,
}

impl Resource {
    pub(crate) fn new(url: Url, is_external: bool, is_interesting: bool) -> Self {
        Self {
            url,
            is_external,
            is_interesting,
            inner: Mutex::new(ResourceInner::default()),
        }
    }

    /// Absolute URL of the resource
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// True if the resource's host differs from the seed's host
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// True if the resource's scheme can be fetched
    pub fn is_interesting(&self) -> bool {
        self.is_interesting
    }

    pub fn state(&self) -> ResourceState {
        lock_unpoisoned(&self.inner).state
    }

    /// Sniffed MIME type, available once the body has been read
    pub fn mime(&self) -> Option<String> {
        lock_unpoisoned(&self.inner).mime.clone()
    }

    /// Size in bytes: the declared length while downloading, the body
    /// length afterwards
    pub fn size(&self) -> u64 {
        lock_unpoisoned(&self.inner).size
    }

    /// Number of failed attempts so far
    pub fn repeats(&self) -> u32 {
        lock_unpoisoned(&self.inner).repeats
    }

    /// Last error of the main processing pipeline
    pub fn error(&self) -> Option<String> {
        lock_unpoisoned(&self.inner).error.clone()
    }

    /// Last non-fatal link extraction error
    pub fn read_error(&self) -> Option<String> {
        lock_unpoisoned(&self.inner).read_error.clone()
    }

    /// Copies every field under a single lock acquisition
    pub fn snapshot(&self) -> ResourceSnapshot {
        let inner = lock_unpoisoned(&self.inner);
        ResourceSnapshot {
            url: self.url.to_string(),
            state: inner.state,
            mime: inner.mime.clone(),
            size: inner.size,
            is_external: self.is_external,
            is_interesting: self.is_interesting,
            error: inner.error.clone(),
            read_error: inner.read_error.clone(),
            repeats: inner.repeats,
        }
    }

    /// Moves the resource to a new state
    ///
    /// Terminal states are final: later transitions are ignored.
    pub(crate) fn set_state(&self, state: ResourceState) {
        let mut inner = lock_unpoisoned(&self.inner);
        if inner.state.is_terminal() {
            tracing::debug!(
                "Ignoring transition {:?} -> {:?} for {}",
                inner.state,
                state,
                self.url
            );
            return;
        }
        inner.state = state;
    }

    /// Moves the resource to a new state and records the primary error
    pub(crate) fn set_state_with_error(&self, state: ResourceState, error: impl Into<String>) {
        let mut inner = lock_unpoisoned(&self.inner);
        if inner.state.is_terminal() {
            return;
        }
        inner.state = state;
        inner.error = Some(error.into());
    }

    /// Records a failed attempt and returns the updated attempt counter
    pub(crate) fn record_failure(&self, error: impl Into<String>) -> u32 {
        let mut inner = lock_unpoisoned(&self.inner);
        inner.repeats += 1;
        inner.error = Some(error.into());
        inner.repeats
    }

    pub(crate) fn set_size(&self, size: u64) {
        lock_unpoisoned(&self.inner).size = size;
    }

    pub(crate) fn set_mime(&self, mime: impl Into<String>) {
        lock_unpoisoned(&self.inner).mime = Some(mime.into());
    }

    pub(crate) fn set_read_error(&self, error: impl Into<String>) {
        lock_unpoisoned(&self.inner).read_error = Some(error.into());
    }
}
