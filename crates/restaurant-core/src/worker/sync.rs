//! Background-sync registrations shared between the page and the worker.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Tag under which deferred reviews request a replay
pub const SYNC_NEW_REVIEWS: &str = "sync-new-reviews";

/// Registry of pending sync tags.
///
/// Registering a tag that is already pending is a no-op, so many deferred
/// reviews coalesce into one sync event.
#[derive(Debug, Clone, Default)]
pub struct SyncManager {
    tags: Arc<Mutex<BTreeSet<String>>>,
}

impl SyncManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a sync event for `tag`. Returns `false` if it was already pending.
    pub fn register(&self, tag: &str) -> bool {
        let inserted = self
            .tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag.to_string());
        if inserted {
            tracing::debug!("Registered background sync tag {}", tag);
        }
        inserted
    }

    /// Tags waiting for dispatch, sorted
    pub fn registered_tags(&self) -> Vec<String> {
        self.tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Remove and return every pending tag.
    pub fn take_registered(&self) -> Vec<String> {
        let mut tags = self.tags.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *tags).into_iter().collect()
    }
}
