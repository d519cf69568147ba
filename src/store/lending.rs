//! Lending record tables: requests, issues, waiting list

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{
    BookId, BorrowRequest, IssueRecord, IssueStatus, RequestStatus, UserId, WaitingListEntry,
};

/// FIFO waiting list keyed by position.
///
/// Positions come from one counter shared by all books (documented
/// upstream behavior), so the BTreeMap key is globally unique and
/// ascending iteration gives promotion order within any one book.
#[derive(Debug, Default)]
pub struct WaitingListQueue {
    entries: RwLock<BTreeMap<u64, WaitingListEntry>>,
    next_id: AtomicI32,
    next_position: AtomicU64,
}

impl WaitingListQueue {
    /// Append a user to the queue for a book, returning the new entry.
    pub fn enqueue(&self, user_id: UserId, book_id: BookId, today: NaiveDate) -> WaitingListEntry {
        let position = self.next_position.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = WaitingListEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            book_id,
            position,
            request_date: today,
        };
        self.entries.write().insert(position, entry.clone());
        entry
    }

    /// Remove and return the lowest-position entry for a book, if any.
    pub fn promote_next(&self, book_id: BookId) -> Option<WaitingListEntry> {
        let mut entries = self.entries.write();
        let position = entries
            .values()
            .find(|e| e.book_id == book_id)
            .map(|e| e.position)?;
        entries.remove(&position)
    }

    pub fn contains(&self, user_id: UserId, book_id: BookId) -> bool {
        self.entries
            .read()
            .values()
            .any(|e| e.user_id == user_id && e.book_id == book_id)
    }

    /// A user's entries, ascending by position.
    pub fn for_user(&self, user_id: UserId) -> Vec<WaitingListEntry> {
        self.entries
            .read()
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Tables for borrow requests and issue records plus the waiting list.
#[derive(Debug, Default)]
pub struct LendingStore {
    requests: RwLock<HashMap<i32, BorrowRequest>>,
    issues: RwLock<HashMap<i32, IssueRecord>>,
    pub waitlist: WaitingListQueue,
    next_request_id: AtomicI32,
    next_issue_id: AtomicI32,
}

impl LendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_request(
        &self,
        user_id: UserId,
        book_id: BookId,
        today: NaiveDate,
    ) -> BorrowRequest {
        let request = BorrowRequest {
            id: self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            book_id,
            status: RequestStatus::Pending,
            request_date: today,
        };
        self.requests.write().insert(request.id, request.clone());
        request
    }

    pub fn get_request(&self, id: i32) -> Option<BorrowRequest> {
        self.requests.read().get(&id).cloned()
    }

    pub fn set_request_status(&self, id: i32, status: RequestStatus) -> AppResult<BorrowRequest> {
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))?;
        request.status = status;
        Ok(request.clone())
    }

    pub fn has_pending_request(&self, user_id: UserId, book_id: BookId) -> bool {
        self.requests.read().values().any(|r| {
            r.user_id == user_id && r.book_id == book_id && r.status == RequestStatus::Pending
        })
    }

    /// Requests with a given status, newest first.
    pub fn requests_by_status(&self, status: RequestStatus) -> Vec<BorrowRequest> {
        let mut requests: Vec<BorrowRequest> = self
            .requests
            .read()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        requests.sort_by(|a, b| (b.request_date, b.id).cmp(&(a.request_date, a.id)));
        requests
    }

    /// All of a user's requests, newest first.
    pub fn requests_for_user(&self, user_id: UserId) -> Vec<BorrowRequest> {
        let mut requests: Vec<BorrowRequest> = self
            .requests
            .read()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| (b.request_date, b.id).cmp(&(a.request_date, a.id)));
        requests
    }

    pub fn create_issue(
        &self,
        user_id: UserId,
        book_id: BookId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> IssueRecord {
        let issue = IssueRecord {
            id: self.next_issue_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            book_id,
            issue_date,
            due_date,
            return_date: None,
            status: IssueStatus::Issued,
        };
        self.issues.write().insert(issue.id, issue.clone());
        issue
    }

    pub fn get_issue(&self, id: i32) -> Option<IssueRecord> {
        self.issues.read().get(&id).cloned()
    }

    pub fn has_active_issue(&self, user_id: UserId, book_id: BookId) -> bool {
        self.issues
            .read()
            .values()
            .any(|i| i.user_id == user_id && i.book_id == book_id && i.is_active())
    }

    /// Mark an issue returned. Fails if unknown or already returned.
    pub fn mark_returned(&self, id: i32, return_date: NaiveDate) -> AppResult<IssueRecord> {
        let mut issues = self.issues.write();
        let issue = issues
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", id)))?;
        if issue.status == IssueStatus::Returned {
            return Err(AppError::NotFound(format!(
                "Issue with id {} already returned",
                id
            )));
        }
        issue.status = IssueStatus::Returned;
        issue.return_date = Some(return_date);
        Ok(issue.clone())
    }

    pub fn active_issues(&self) -> Vec<IssueRecord> {
        self.issues
            .read()
            .values()
            .filter(|i| i.is_active())
            .cloned()
            .collect()
    }

    pub fn issues_for_user(&self, user_id: UserId) -> Vec<IssueRecord> {
        self.issues
            .read()
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn count_active(&self) -> usize {
        self.issues.read().values().filter(|i| i.is_active()).count()
    }

    pub fn count_overdue(&self, today: NaiveDate) -> usize {
        self.issues
            .read()
            .values()
            .filter(|i| i.is_overdue(today))
            .count()
    }
}
