//! In-memory store layer.
//!
//! Plays the role the repository layer plays in a database-backed
//! deployment: it owns the record tables and the per-book locks the
//! lending service serializes its critical sections on.

pub mod books;
pub mod lending;

pub use books::BookStore;
pub use lending::LendingStore;

/// Main store struct holding all record tables
#[derive(Debug, Default)]
pub struct Store {
    pub books: BookStore,
    pub lending: LendingStore,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
