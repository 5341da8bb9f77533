//! Loan records and their read-time projection

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BookId, LoanId, MemberId};

use crate::error::CirculationError;
use crate::fine::FinePolicy;
use crate::MONEY_PRECISION;

/// One copy of a book lent to one member
///
/// `borrowed_at` and `due_at` are fixed at creation. `returned_at` and `fine`
/// are written exactly once by [`Loan::close`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine: Decimal,
}

/// Where a loan is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Out and not yet due
    Active,
    /// Out and past its due instant
    Overdue,
    /// Closed
    Returned,
}

impl Loan {
    /// Opens a loan at `borrowed_at`, due `due_days` later
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the due instant falls outside the representable
    /// calendar.
    pub fn open(
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
        due_days: i64,
    ) -> Result<Self, CirculationError> {
        let due_at = Duration::try_days(due_days)
            .and_then(|period| borrowed_at.checked_add_signed(period))
            .ok_or_else(|| {
                CirculationError::invalid(format!("due_days out of range (got {})", due_days))
            })?;
        Ok(Self {
            id: LoanId::new_v7(),
            book_id,
            member_id,
            borrowed_at,
            due_at,
            returned_at: None,
            fine: Decimal::new(0, MONEY_PRECISION),
        })
    }

    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        match self.returned_at {
            Some(_) => LoanStatus::Returned,
            None if now > self.due_at => LoanStatus::Overdue,
            None => LoanStatus::Active,
        }
    }

    /// Closes the loan
    ///
    /// Fails with `AlreadyReturned` and leaves the record untouched if the
    /// loan was closed before.
    pub fn close(&mut self, returned_at: DateTime<Utc>, fine: Decimal) -> Result<(), CirculationError> {
        if self.is_returned() {
            return Err(CirculationError::AlreadyReturned { loan_id: self.id });
        }
        self.returned_at = Some(returned_at);
        self.fine = fine;
        Ok(())
    }
}

/// A loan as shown to callers
///
/// For overdue loans `fine` carries an estimate at the standing rate; the
/// stored `loan.fine` is only ever written by a return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub status: LoanStatus,
    pub fine_due: Decimal,
}

impl LoanView {
    pub fn project(loan: Loan, now: DateTime<Utc>, policy: &FinePolicy) -> Self {
        let status = loan.status(now);
        let fine_due = match status {
            LoanStatus::Overdue => policy.estimate(loan.due_at, now),
            LoanStatus::Active => Decimal::new(0, MONEY_PRECISION),
            LoanStatus::Returned => loan.fine,
        };
        Self {
            loan,
            status,
            fine_due,
        }
    }

    /// True when `fine_due` is a projection rather than a finalized fine
    pub fn is_estimate(&self) -> bool {
        self.status == LoanStatus::Overdue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    fn loan() -> Loan {
        Loan::open(BookId::new(), MemberId::new(), start(), 7).unwrap()
    }

    #[test]
    fn test_open_rejects_unrepresentable_due_date() {
        let result = Loan::open(BookId::new(), MemberId::new(), start(), 100_000_000);
        assert!(matches!(result, Err(CirculationError::InvalidArgument(_))));

        let result = Loan::open(BookId::new(), MemberId::new(), start(), i64::MAX);
        assert!(matches!(result, Err(CirculationError::InvalidArgument(_))));
    }

    #[test]
    fn test_open_sets_due_date() {
        let loan = loan();
        assert_eq!(loan.due_at, Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap());
        assert_eq!(loan.fine, Decimal::ZERO);
        assert!(!loan.is_returned());
    }

    #[test]
    fn test_status_transitions() {
        let mut loan = loan();
        assert_eq!(loan.status(start()), LoanStatus::Active);
        assert_eq!(loan.status(loan.due_at), LoanStatus::Active);
        assert_eq!(loan.status(loan.due_at + Duration::seconds(1)), LoanStatus::Overdue);

        loan.close(start() + Duration::days(10), dec!(3)).unwrap();
        assert_eq!(loan.status(start() + Duration::days(30)), LoanStatus::Returned);
    }

    #[test]
    fn test_close_twice_is_rejected() {
        let mut loan = loan();
        let first = start() + Duration::days(1);
        loan.close(first, Decimal::ZERO).unwrap();

        let again = loan.close(start() + Duration::days(20), dec!(13));
        assert!(matches!(again, Err(CirculationError::AlreadyReturned { .. })));
        assert_eq!(loan.returned_at, Some(first));
        assert_eq!(loan.fine, Decimal::ZERO);
    }

    #[test]
    fn test_projection_estimates_overdue_without_mutating() {
        let loan = loan();
        let now = loan.due_at + Duration::days(3) + Duration::hours(5);
        let view = LoanView::project(loan.clone(), now, &FinePolicy::default());

        assert_eq!(view.status, LoanStatus::Overdue);
        assert_eq!(view.fine_due, dec!(3));
        assert!(view.is_estimate());
        assert_eq!(view.loan.fine, Decimal::ZERO);
    }

    #[test]
    fn test_projection_of_returned_loan_uses_stored_fine() {
        let mut loan = loan();
        loan.close(loan.due_at + Duration::days(2), dec!(4)).unwrap();
        let view = LoanView::project(loan, start() + Duration::days(100), &FinePolicy::default());
        assert_eq!(view.fine_due, dec!(4));
        assert!(!view.is_estimate());
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = LoanView::project(loan(), start(), &FinePolicy::default());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("book_id").is_some());
        assert_eq!(json["status"], "active");
    }
}
