//! Loan DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BookId, LoanId, MemberId};
use domain_circulation::{LoanStatus, LoanView};

#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub member_id: MemberId,
    /// Loan period; absent or non-positive uses the library default
    pub due_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    /// Daily rate; absent or zero uses the library default
    pub fine_per_day: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Finalized fine; zero until the loan is returned
    pub fine: Decimal,
    /// Amount owed as of now; an estimate while the loan is overdue
    pub fine_due: Decimal,
    pub fine_is_estimate: bool,
}

impl From<LoanView> for LoanResponse {
    fn from(view: LoanView) -> Self {
        let fine_is_estimate = view.is_estimate();
        let loan = view.loan;
        Self {
            id: loan.id,
            book_id: loan.book_id,
            member_id: loan.member_id,
            borrowed_at: loan.borrowed_at,
            due_at: loan.due_at,
            returned_at: loan.returned_at,
            status: view.status,
            fine: loan.fine,
            fine_due: view.fine_due,
            fine_is_estimate,
        }
    }
}
