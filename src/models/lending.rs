//! Lending models: borrow requests, issue records, waiting list entries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// Borrow request lifecycle. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A user's request to borrow a book, awaiting admin approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: RequestStatus,
    pub request_date: NaiveDate,
}

/// Issue lifecycle. Overdue is never stored; it is derived at read time
/// from the due date (see [`IssueRecord::is_overdue`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Issued,
    Returned,
}

/// An issued copy of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: i32,
    pub user_id: UserId,
    pub book_id: BookId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: IssueStatus,
}

impl IssueRecord {
    /// Whether the issue is overdue as of `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == IssueStatus::Issued && today > self.due_date
    }

    /// An issue is active until it is returned.
    pub fn is_active(&self) -> bool {
        self.status == IssueStatus::Issued
    }
}

/// Deferred borrow request for an out-of-stock book.
///
/// `position` comes from a single counter shared by every book, so
/// positions are globally unique but not dense per book. Promotion order
/// per book is still ascending position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingListEntry {
    pub id: i32,
    pub user_id: UserId,
    pub book_id: BookId,
    pub position: u64,
    pub request_date: NaiveDate,
}

/// Outcome of a borrow request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BorrowOutcome {
    /// Stock was available; a request now awaits admin approval.
    Pending { request: BorrowRequest },
    /// No copies available; the user was queued on the waiting list.
    Waiting { entry: WaitingListEntry },
}

/// Outcome of an approval. Running out of stock between request and
/// approval is resolved fail-soft as a rejection, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApprovalOutcome {
    Issued { issue: IssueRecord },
    Rejected,
}

/// Result of returning an issued copy. The fine is informational output
/// for the caller; it is not persisted as an entity.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnReceipt {
    pub issue: IssueRecord,
    pub fine_days: i64,
    pub fine: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_is_derived_from_due_date() {
        let issue = IssueRecord {
            id: 1,
            user_id: 1,
            book_id: 1,
            issue_date: date(2024, 1, 1),
            due_date: date(2024, 1, 15),
            return_date: None,
            status: IssueStatus::Issued,
        };
        assert!(!issue.is_overdue(date(2024, 1, 15)));
        assert!(issue.is_overdue(date(2024, 1, 16)));
    }

    #[test]
    fn test_returned_issue_is_never_overdue() {
        let issue = IssueRecord {
            id: 1,
            user_id: 1,
            book_id: 1,
            issue_date: date(2024, 1, 1),
            due_date: date(2024, 1, 15),
            return_date: Some(date(2024, 2, 1)),
            status: IssueStatus::Returned,
        };
        assert!(!issue.is_overdue(date(2024, 3, 1)));
    }
}
