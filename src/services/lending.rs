//! Lending service: the borrow/approve/return state machine.
//!
//! Every operation that reads or writes a book's available-copy counter
//! runs inside that book's lock, together with the creation of whatever
//! record depends on the counter's value. Two concurrent approvals against
//! a single remaining copy therefore resolve to exactly one issue and one
//! rejection, and the counter can never go negative.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        ApprovalOutcome, BookId, BorrowOutcome, BorrowRequest, IssueRecord, RequestStatus,
        ReturnReceipt, UserId, WaitingListEntry,
    },
    store::Store,
};

#[derive(Clone)]
pub struct LendingService {
    store: Arc<Store>,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(store: Arc<Store>, config: LendingConfig) -> Self {
        Self { store, config }
    }

    /// File a borrow request for a book, or queue the user when no copy
    /// is available. Stock is not decremented here; that happens at
    /// approval, so pending requests still race for the remaining copies.
    pub fn request_borrow(&self, user_id: UserId, book_id: BookId) -> AppResult<BorrowOutcome> {
        self.request_borrow_on(user_id, book_id, Utc::now().date_naive())
    }

    /// Date-explicit variant of [`request_borrow`](Self::request_borrow).
    pub fn request_borrow_on(
        &self,
        user_id: UserId,
        book_id: BookId,
        today: NaiveDate,
    ) -> AppResult<BorrowOutcome> {
        self.store.books.require(book_id)?;

        let lock = self.store.books.book_lock(book_id);
        let _guard = lock.lock();

        if self.store.lending.has_active_issue(user_id, book_id) {
            return Err(AppError::DuplicateActiveIssue);
        }
        if self.store.lending.has_pending_request(user_id, book_id) {
            return Err(AppError::DuplicatePendingRequest);
        }
        if self.store.lending.waitlist.contains(user_id, book_id) {
            return Err(AppError::AlreadyWaiting);
        }

        let book = self.store.books.require(book_id)?;
        if book.available_copies > 0 {
            let request = self.store.lending.create_request(user_id, book_id, today);
            tracing::info!(user_id, book_id, request_id = request.id, "borrow request filed");
            Ok(BorrowOutcome::Pending { request })
        } else {
            let entry = self.store.lending.waitlist.enqueue(user_id, book_id, today);
            tracing::info!(
                user_id,
                book_id,
                position = entry.position,
                "book out of stock, user queued on waiting list"
            );
            Ok(BorrowOutcome::Waiting { entry })
        }
    }

    /// Approve a pending request. Stock is re-checked under the book lock:
    /// if the last copy went to a racing approval in the meantime, the
    /// request is auto-rejected rather than surfaced as an error.
    pub fn approve_request(&self, request_id: i32) -> AppResult<ApprovalOutcome> {
        self.approve_request_on(request_id, Utc::now().date_naive())
    }

    /// Date-explicit variant of [`approve_request`](Self::approve_request).
    pub fn approve_request_on(
        &self,
        request_id: i32,
        today: NaiveDate,
    ) -> AppResult<ApprovalOutcome> {
        let request = self
            .store
            .lending
            .get_request(request_id)
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", request_id)))?;

        let lock = self.store.books.book_lock(request.book_id);
        let _guard = lock.lock();

        // Re-read under the lock: a racing approval may have decided it.
        let request = self
            .store
            .lending
            .get_request(request_id)
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", request_id)))?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::Validation(format!(
                "Request {} has already been decided",
                request_id
            )));
        }

        let book = self.store.books.require(request.book_id)?;
        if book.available_copies > 0 {
            self.store.books.adjust_available(request.book_id, -1)?;
            let issue = self.store.lending.create_issue(
                request.user_id,
                request.book_id,
                today,
                today + Duration::days(self.config.loan_period_days),
            );
            self.store
                .lending
                .set_request_status(request_id, RequestStatus::Approved)?;
            tracing::info!(
                request_id,
                issue_id = issue.id,
                book_id = request.book_id,
                due_date = %issue.due_date,
                "request approved, copy issued"
            );
            Ok(ApprovalOutcome::Issued { issue })
        } else {
            self.store
                .lending
                .set_request_status(request_id, RequestStatus::Rejected)?;
            tracing::warn!(
                request_id,
                book_id = request.book_id,
                "no copies left at approval time, request auto-rejected"
            );
            Ok(ApprovalOutcome::Rejected)
        }
    }

    /// Reject a request unconditionally.
    pub fn reject_request(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let request = self
            .store
            .lending
            .set_request_status(request_id, RequestStatus::Rejected)?;
        tracing::info!(request_id, book_id = request.book_id, "request rejected");
        Ok(request)
    }

    /// Return an issued copy, computing the overdue fine and releasing the
    /// copy back to stock. When the book comes back into stock the earliest
    /// waiting-list entry is promoted to a pending request.
    pub fn return_item(&self, issue_id: i32) -> AppResult<ReturnReceipt> {
        self.return_item_on(issue_id, Utc::now().date_naive())
    }

    /// Date-explicit variant of [`return_item`](Self::return_item), for
    /// callers recording a return after the fact.
    pub fn return_item_on(&self, issue_id: i32, returned_on: NaiveDate) -> AppResult<ReturnReceipt> {
        let issue = self
            .store
            .lending
            .get_issue(issue_id)
            .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", issue_id)))?;

        let lock = self.store.books.book_lock(issue.book_id);
        let _guard = lock.lock();

        let issue = self.store.lending.mark_returned(issue_id, returned_on)?;

        let fine_days = (returned_on - issue.due_date).num_days().max(0);
        let fine = Decimal::from(fine_days) * self.config.fine_per_day;

        let available = self.store.books.adjust_available(issue.book_id, 1)?;
        tracing::info!(
            issue_id,
            book_id = issue.book_id,
            fine_days,
            %fine,
            available,
            "copy returned"
        );

        // A copy just came back into stock; hand it to the head of the
        // waiting list as a pending request. Admin approval still gates
        // the actual issue, so stock is not consumed here.
        if available == 1 {
            if let Some(entry) = self.store.lending.waitlist.promote_next(issue.book_id) {
                let request = self.store.lending.create_request(
                    entry.user_id,
                    entry.book_id,
                    returned_on,
                );
                tracing::info!(
                    book_id = entry.book_id,
                    user_id = entry.user_id,
                    position = entry.position,
                    request_id = request.id,
                    "waiting-list entry promoted to pending request"
                );
            }
        }

        Ok(ReturnReceipt {
            issue,
            fine_days,
            fine,
        })
    }

    /// Pending requests, newest first (admin approval queue).
    pub fn pending_requests(&self) -> Vec<BorrowRequest> {
        self.store.lending.requests_by_status(RequestStatus::Pending)
    }

    /// A user's requests, newest first.
    pub fn requests_for_user(&self, user_id: UserId) -> Vec<BorrowRequest> {
        self.store.lending.requests_for_user(user_id)
    }

    /// A user's waiting-list entries, ascending by position.
    pub fn waitlist_for_user(&self, user_id: UserId) -> Vec<WaitingListEntry> {
        self.store.lending.waitlist.for_user(user_id)
    }

    /// A user's issue records (active and returned).
    pub fn issues_for_user(&self, user_id: UserId) -> Vec<IssueRecord> {
        self.store.lending.issues_for_user(user_id)
    }

    /// Active issues ordered by book title (admin issue/receive screen).
    pub fn active_issues(&self) -> Vec<IssueRecord> {
        let mut issues = self.store.lending.active_issues();
        issues.sort_by_key(|i| {
            let title = self
                .store
                .books
                .get(i.book_id)
                .map(|b| b.title.to_lowercase())
                .unwrap_or_default();
            (title, i.id)
        });
        issues
    }

    /// Count active loans
    pub fn count_active(&self) -> usize {
        self.store.lending.count_active()
    }

    /// Count overdue loans as of today (derived, never stored).
    pub fn count_overdue(&self) -> usize {
        self.store.lending.count_overdue(Utc::now().date_naive())
    }
}
