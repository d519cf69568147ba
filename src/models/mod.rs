//! Domain models for the circulation core

pub mod book;
pub mod lending;

pub use book::{Book, BookQuery, NewBook, Page};
pub use lending::{
    ApprovalOutcome, BorrowOutcome, BorrowRequest, IssueRecord, IssueStatus, RequestStatus,
    ReturnReceipt, WaitingListEntry,
};

/// Catalog item identifier (assigned by the book store).
pub type BookId = i32;
/// Borrower identifier (owned by the external user/auth collaborator).
pub type UserId = i32;
/// Genre taxonomy identifier (owned by the external taxonomy collaborator).
pub type GenreId = i32;
/// Language taxonomy identifier (owned by the external taxonomy collaborator).
pub type LanguageId = i32;
