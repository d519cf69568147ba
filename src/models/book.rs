//! Book (catalog entry) model and query types

use serde::{Deserialize, Serialize};

use super::{BookId, GenreId, LanguageId};

/// Catalog entry. Bibliographic fields are owned by the external admin
/// collaborator; the core only ever mutates `available_copies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub genre_ids: Vec<GenreId>,
    pub language_id: Option<LanguageId>,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Book {
    /// Text fed to the inverted index: title plus description.
    pub fn indexed_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

/// Payload for registering a new catalog entry; the store assigns the id
/// and starts with every copy available.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub genre_ids: Vec<GenreId>,
    pub language_id: Option<LanguageId>,
    pub total_copies: u32,
}

/// Catalog query filters. Include sets apply only when non-empty; exclude
/// sets always apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub genre_include: Vec<GenreId>,
    #[serde(default)]
    pub genre_exclude: Vec<GenreId>,
    #[serde(default)]
    pub language_include: Vec<LanguageId>,
    #[serde(default)]
    pub language_exclude: Vec<LanguageId>,
    /// 1-based page number; out-of-range values clamp to a valid page.
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

/// One page of query results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Paginate a fully filtered, fully sorted result list. Page numbers
    /// below 1 clamp to the first page and numbers past the end clamp to
    /// the last page, so a stale page link never errors.
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let total_items = all.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let items: Vec<T> = all
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect();

        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}
