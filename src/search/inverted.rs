//! Word-to-book inverted index for exact-token lookups

use std::collections::{HashMap, HashSet};

use crate::models::{Book, BookId};

use super::tokenize;

/// Exact-token index over title + description. The primary query path uses
/// the trie for prefix semantics; this answers whole-word lookups.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, HashSet<BookId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a corpus of books.
    pub fn build<'a>(corpus: impl IntoIterator<Item = &'a Book>) -> Self {
        let mut index = Self::new();
        for book in corpus {
            for token in tokenize(&book.indexed_text()) {
                index.add(token, book.id);
            }
        }
        index
    }

    pub(crate) fn add(&mut self, token: String, id: BookId) {
        self.postings.entry(token).or_default().insert(id);
    }

    /// Exact-token membership test; returns a possibly empty id set.
    pub fn lookup(&self, word: &str) -> HashSet<BookId> {
        self.postings
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Iterate all (term, ids) postings; used by the wire encoder.
    pub(crate) fn postings(&self) -> impl Iterator<Item = (&String, &HashSet<BookId>)> {
        self.postings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: BookId, title: &str, description: Option<&str>) -> Book {
        Book {
            id,
            isbn: None,
            title: title.to_string(),
            author: "anon".to_string(),
            description: description.map(str::to_string),
            image_url: None,
            genre_ids: vec![],
            language_id: None,
            total_copies: 1,
            available_copies: 1,
        }
    }

    #[test]
    fn test_lookup_covers_title_and_description() {
        let books = [
            book(1, "Dune", Some("A desert planet")),
            book(2, "Foundation", None),
        ];
        let index = InvertedIndex::build(&books);

        assert_eq!(index.lookup("desert"), HashSet::from([1]));
        assert_eq!(index.lookup("foundation"), HashSet::from([2]));
        assert!(index.lookup("dese").is_empty(), "no prefix semantics here");
    }

    #[test]
    fn test_shared_token_maps_to_both_books() {
        let books = [
            book(1, "Rust in Action", None),
            book(2, "Programming Rust", None),
        ];
        let index = InvertedIndex::build(&books);
        assert_eq!(index.lookup("Rust"), HashSet::from([1, 2]));
    }
}
