//! Published index snapshots with atomic rebuild-and-swap

use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::Book;

use super::{tokenize, InvertedIndex, PrefixTrie};

/// Immutable (trie, inverted index) pair tagged with a generation number.
/// Once published it is never mutated; a rebuild produces a new snapshot.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub generation: u64,
    pub trie: PrefixTrie,
    pub inverted: InvertedIndex,
}

/// Holds the current snapshot. Readers clone the `Arc` under a briefly
/// held read lock and query without any lock; in-flight readers keep
/// seeing their (possibly stale) snapshot across a rebuild.
#[derive(Debug, Default)]
pub struct SearchIndexStore {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl SearchIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest published snapshot, or `None` if no rebuild has ever run.
    pub fn current(&self) -> Option<Arc<IndexSnapshot>> {
        self.current.read().clone()
    }

    /// Generation of the published snapshot; 0 when unbuilt.
    pub fn generation(&self) -> u64 {
        self.current.read().as_ref().map(|s| s.generation).unwrap_or(0)
    }

    /// Build a fresh trie (title tokens) and inverted index (title +
    /// description) off to the side, then publish them atomically with
    /// generation = previous + 1. An empty corpus leaves the published
    /// state unchanged.
    pub fn rebuild<'a>(&self, corpus: impl IntoIterator<Item = &'a Book>) -> u64 {
        let books: Vec<&Book> = corpus.into_iter().collect();
        if books.is_empty() {
            tracing::info!("index rebuild skipped: empty corpus");
            return self.generation();
        }

        let mut trie = PrefixTrie::new();
        for book in &books {
            // Only titles feed the live prefix search.
            for token in tokenize(&book.title) {
                trie.insert(&token, book.id);
            }
        }
        let inverted = InvertedIndex::build(books.iter().copied());

        // The write lock is held only for the generation bump and pointer
        // swap, never during construction.
        let mut slot = self.current.write();
        let generation = slot.as_ref().map(|s| s.generation).unwrap_or(0) + 1;
        *slot = Some(Arc::new(IndexSnapshot {
            generation,
            trie,
            inverted,
        }));
        drop(slot);

        tracing::info!(generation, books = books.len(), "search index published");
        generation
    }

    /// Publish an externally decoded snapshot (wire import). Stale
    /// generations are refused so a cached blob can never roll the live
    /// index backwards.
    pub(crate) fn install(&self, snapshot: IndexSnapshot) -> bool {
        let mut slot = self.current.write();
        let live = slot.as_ref().map(|s| s.generation).unwrap_or(0);
        if snapshot.generation <= live {
            tracing::warn!(
                wire_generation = snapshot.generation,
                live_generation = live,
                "refusing stale index wire snapshot"
            );
            return false;
        }
        *slot = Some(Arc::new(snapshot));
        true
    }
}
