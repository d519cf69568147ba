//! Error types for the circulation core

use serde::Serialize;
use thiserror::Error;

/// Stable numeric reason codes consumed by callers across the
/// lending/search boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotFound = 2,
    DuplicateIssue = 3,
    DuplicateRequest = 4,
    AlreadyWaiting = 5,
    BadValue = 6,
    IndexCorrupt = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user already holds an active (issued or overdue) copy.
    #[error("This book is already issued to the user")]
    DuplicateActiveIssue,

    /// A pending approval request already exists for this (user, book) pair.
    #[error("A pending request already exists for this book")]
    DuplicatePendingRequest,

    /// The user is already queued on the waiting list for this book.
    #[error("The user is already on the waiting list for this book")]
    AlreadyWaiting,

    #[error("Validation error: {0}")]
    Validation(String),

    /// The cached index wire blob could not be decoded; the caller should
    /// run a fresh rebuild.
    #[error("Index wire format error: {0}")]
    IndexWire(String),
}

impl AppError {
    /// Reason code for structured consumption by the caller.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::DuplicateActiveIssue => ErrorCode::DuplicateIssue,
            AppError::DuplicatePendingRequest => ErrorCode::DuplicateRequest,
            AppError::AlreadyWaiting => ErrorCode::AlreadyWaiting,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::IndexWire(_) => ErrorCode::IndexCorrupt,
        }
    }
}

/// Result type alias for core operations
pub type AppResult<T> = Result<T, AppError>;
