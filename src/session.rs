//! Per-session recently-viewed cache.
//!
//! One instance belongs to one browsing session; the external session
//! collaborator creates it on first use, persists [`RecentlyViewed::to_state`]
//! under the configured session key, and drops it when the session dies.
//! Cross-session interference is impossible because sessions own disjoint
//! instances.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::models::BookId;

/// Bounded move-to-front list of viewed book ids, most recent first.
pub struct RecentlyViewed {
    // Mutex serializes overlapping requests from the same session so a
    // pair of concurrent views cannot lose an update.
    inner: Mutex<LruCache<BookId, ()>>,
}

impl RecentlyViewed {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Rehydrate from a persisted state (ids most recent first).
    pub fn from_state(capacity: usize, ids: &[BookId]) -> Self {
        let cache = Self::new(capacity);
        {
            let mut inner = cache.inner.lock();
            for id in ids.iter().rev() {
                inner.put(*id, ());
            }
        }
        cache
    }

    /// Record a view: an already-present id moves to the front, and the
    /// least recently viewed id falls off once capacity is exceeded.
    pub fn add(&self, id: BookId) {
        self.inner.lock().put(id, ());
    }

    /// Current ids, most recent first.
    pub fn ordered_ids(&self) -> Vec<BookId> {
        self.inner.lock().iter().map(|(id, _)| *id).collect()
    }

    /// Snapshot for session persistence under the configured key.
    pub fn to_state(&self) -> Vec<BookId> {
        self.ordered_ids()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
