//! Book table and per-book lock registry

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{AppError, AppResult};
use crate::models::{Book, BookId, NewBook};

/// Registry of catalog entries plus one lock per book id.
///
/// The per-book lock is the serialization point for every read-modify-write
/// of `available_copies`; see [`crate::services::lending`].
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<HashMap<BookId, Book>>,
    locks: Mutex<HashMap<BookId, Arc<Mutex<()>>>>,
    next_id: AtomicI32,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new catalog entry; all copies start available.
    pub fn insert(&self, new: NewBook) -> Book {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let book = Book {
            id,
            isbn: new.isbn,
            title: new.title,
            author: new.author,
            description: new.description,
            image_url: new.image_url,
            genre_ids: new.genre_ids,
            language_id: new.language_id,
            total_copies: new.total_copies,
            available_copies: new.total_copies,
        };
        self.books.write().insert(id, book.clone());
        book
    }

    pub fn get(&self, id: BookId) -> Option<Book> {
        self.books.read().get(&id).cloned()
    }

    pub fn require(&self, id: BookId) -> AppResult<Book> {
        self.get(id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// All books ordered by title ascending (case-folded), id as tiebreak.
    pub fn all_by_title(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.read().values().cloned().collect();
        books.sort_by(|a, b| {
            (a.title.to_lowercase(), a.id).cmp(&(b.title.to_lowercase(), b.id))
        });
        books
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }

    /// The serialization lock for one book, created on first use.
    pub(crate) fn book_lock(&self, id: BookId) -> Arc<Mutex<()>> {
        self.locks.lock().entry(id).or_default().clone()
    }

    /// Apply `delta` to a book's available-copy counter, enforcing
    /// 0 <= available <= total. Callers must hold the book's lock.
    pub(crate) fn adjust_available(&self, id: BookId, delta: i64) -> AppResult<u32> {
        let mut books = self.books.write();
        let book = books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let next = book.available_copies as i64 + delta;
        if next < 0 || next > book.total_copies as i64 {
            return Err(AppError::Validation(format!(
                "available copies for book {} would leave range: {} + {}",
                id, book.available_copies, delta
            )));
        }
        book.available_copies = next as u32;
        Ok(book.available_copies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, copies: u32) -> NewBook {
        NewBook {
            isbn: None,
            title: title.to_string(),
            author: "anon".to_string(),
            description: None,
            image_url: None,
            genre_ids: vec![],
            language_id: None,
            total_copies: copies,
        }
    }

    #[test]
    fn test_insert_assigns_ids_and_full_availability() {
        let store = BookStore::new();
        let a = store.insert(new_book("Dune", 3));
        let b = store.insert(new_book("Emma", 1));
        assert_ne!(a.id, b.id);
        assert_eq!(a.available_copies, 3);
    }

    #[test]
    fn test_all_by_title_is_case_insensitive() {
        let store = BookStore::new();
        store.insert(new_book("zebra", 1));
        store.insert(new_book("Apple", 1));
        store.insert(new_book("mango", 1));
        let titles: Vec<String> = store.all_by_title().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Apple", "mango", "zebra"]);
    }

    #[test]
    fn test_adjust_available_guards_both_bounds() {
        let store = BookStore::new();
        let book = store.insert(new_book("Dune", 1));
        assert!(store.adjust_available(book.id, -1).is_ok());
        assert!(store.adjust_available(book.id, -1).is_err());
        assert!(store.adjust_available(book.id, 1).is_ok());
        assert!(store.adjust_available(book.id, 1).is_err());
    }
}
