//! Catalog service: browsing, prefix search, index lifecycle

use std::sync::Arc;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{Book, BookQuery, NewBook, Page},
    search::{wire, SearchIndexStore},
    session::RecentlyViewed,
    store::Store,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<Store>,
    index: Arc<SearchIndexStore>,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(store: Arc<Store>, index: Arc<SearchIndexStore>, config: CatalogConfig) -> Self {
        Self {
            store,
            index,
            config,
        }
    }

    /// Register a new catalog entry (admin collaborator entry point).
    /// The search index reflects it after the next rebuild.
    pub fn add_book(&self, new: NewBook) -> Book {
        let book = self.store.books.insert(new);
        tracing::info!(book_id = book.id, title = %book.title, "book added to catalog");
        book
    }

    pub fn get_book(&self, id: i32) -> AppResult<Book> {
        self.store.books.require(id)
    }

    /// Book detail view: fetches the book and records it in the session's
    /// recently-viewed list.
    pub fn view_book(&self, id: i32, recent: &RecentlyViewed) -> AppResult<Book> {
        let book = self.store.books.require(id)?;
        recent.add(book.id);
        Ok(book)
    }

    /// Project a session's recently-viewed ids back to books, preserving
    /// most-recent-first order. Ids whose book has since been deleted are
    /// skipped.
    pub fn recently_viewed(&self, recent: &RecentlyViewed) -> Vec<Book> {
        recent
            .ordered_ids()
            .into_iter()
            .filter_map(|id| self.store.books.get(id))
            .collect()
    }

    /// Run a catalog query: optional search text, genre/language
    /// include/exclude sets, fixed-size pagination, title order.
    ///
    /// Search text uses the published trie for prefix matching; when no
    /// index has been built yet the query degrades to a case-insensitive
    /// substring scan over titles rather than failing.
    pub fn query(&self, query: &BookQuery) -> Page<Book> {
        let mut books = self.store.books.all_by_title();

        let search = query
            .search
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if !search.is_empty() {
            match self.index.current() {
                Some(snapshot) => {
                    let ids = snapshot.trie.search_prefix(&search);
                    books.retain(|b| ids.contains(&b.id));
                }
                None => {
                    tracing::warn!("search index unbuilt, using substring scan");
                    books.retain(|b| b.title.to_lowercase().contains(&search));
                }
            }
        }

        if !query.genre_include.is_empty() {
            books.retain(|b| b.genre_ids.iter().any(|g| query.genre_include.contains(g)));
        }
        books.retain(|b| !b.genre_ids.iter().any(|g| query.genre_exclude.contains(g)));

        if !query.language_include.is_empty() {
            books.retain(|b| {
                b.language_id
                    .map(|l| query.language_include.contains(&l))
                    .unwrap_or(false)
            });
        }
        books.retain(|b| {
            b.language_id
                .map(|l| !query.language_exclude.contains(&l))
                .unwrap_or(true)
        });

        Page::paginate(books, query.page, self.config.page_size)
    }

    /// Rebuild the search index from the full catalog and publish it.
    /// Idempotent: repeated rebuilds of an unchanged catalog answer every
    /// query identically.
    pub fn rebuild_index(&self) -> u64 {
        let books = self.store.books.all_by_title();
        self.index.rebuild(&books)
    }

    /// Export the published snapshot in the versioned wire format.
    pub fn export_index_wire(&self) -> AppResult<Vec<u8>> {
        let snapshot = self.index.current().ok_or_else(|| {
            crate::error::AppError::Validation("no index snapshot published yet".to_string())
        })?;
        wire::encode(&snapshot)
    }

    /// Import a cached index blob. A corrupt or version-skewed blob is
    /// logged and answered with a fresh rebuild instead of an error, and a
    /// stale generation is ignored; queries keep working either way.
    pub fn import_index_wire(&self, bytes: &[u8]) -> u64 {
        match wire::decode(bytes) {
            Ok(snapshot) => {
                // A stale blob is refused by the store; either way the
                // live generation is the answer.
                self.index.install(snapshot);
                self.index.generation()
            }
            Err(err) => {
                tracing::error!(error = %err, "index wire blob rejected, rebuilding");
                self.rebuild_index()
            }
        }
    }

    pub fn index_store(&self) -> &Arc<SearchIndexStore> {
        &self.index
    }
}
