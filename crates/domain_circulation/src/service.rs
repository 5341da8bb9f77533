//! Circulation service
//!
//! The loan lifecycle manager. It owns no state of its own: every operation
//! goes through the injected [`CirculationStore`], and compound operations
//! hold a [`crate::ports::StoreSession`] from the first read to the commit.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use core_kernel::{BookId, Clock, HealthCheckResult, LoanId, MemberId, SystemClock};

use crate::book::{Book, BookPatch, NewBook};
use crate::error::CirculationError;
use crate::fine::{compute_fine, FinePolicy};
use crate::inventory;
use crate::loan::{Loan, LoanView};
use crate::member::{Member, MemberPatch, NewMember};
use crate::ports::CirculationStore;
use crate::DEFAULT_DUE_DAYS;

/// Library-wide defaults for borrow and return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirculationPolicy {
    default_due_days: i64,
    fines: FinePolicy,
}

impl CirculationPolicy {
    /// Creates a policy
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `default_due_days` is not positive or the fine
    /// rate is negative.
    pub fn new(default_due_days: i64, fine_per_day: Decimal) -> Result<Self, CirculationError> {
        if default_due_days <= 0 {
            return Err(CirculationError::invalid(format!(
                "default_due_days must be positive (got {})",
                default_due_days
            )));
        }
        Ok(Self {
            default_due_days,
            fines: FinePolicy::new(fine_per_day)?,
        })
    }

    pub fn default_due_days(&self) -> i64 {
        self.default_due_days
    }

    pub fn fines(&self) -> &FinePolicy {
        &self.fines
    }

    /// Due period for one borrow; absent or non-positive requests use the default
    pub fn due_days(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(days) if days > 0 => days,
            _ => self.default_due_days,
        }
    }
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self {
            default_due_days: DEFAULT_DUE_DAYS,
            fines: FinePolicy::default(),
        }
    }
}

/// Entry point for every library operation
#[derive(Clone)]
pub struct CirculationService {
    store: Arc<dyn CirculationStore>,
    clock: Arc<dyn Clock>,
    policy: CirculationPolicy,
}

impl CirculationService {
    /// Creates a service over `store` with the wall clock and default policy
    pub fn new(store: Arc<dyn CirculationStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            policy: CirculationPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: CirculationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    /// Reports the health of the backing store
    pub async fn health_check(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    // ========================================================================
    // Circulation
    // ========================================================================

    /// Lends one copy of a book to a member
    ///
    /// The availability check, the decrement, and the new loan commit in one
    /// session holding the book's row lock, so concurrent borrows of the last
    /// copy see exactly one success.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the book or member does not exist
    /// - `BookUnavailable` if no copies are on the shelf
    /// - `InvalidArgument` if `due_days` puts the due date beyond the calendar
    /// - `Internal` on storage failure (nothing is written)
    #[instrument(skip_all, fields(book_id = %book_id, member_id = %member_id, due_days = ?due_days))]
    pub async fn borrow_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
        due_days: Option<i64>,
    ) -> Result<Loan, CirculationError> {
        let due_days = self.policy.due_days(due_days);
        let loan = Loan::open(book_id, member_id, self.clock.now(), due_days)?;
        let mut session = self.store.begin().await?;

        let mut book = session
            .book_for_update(book_id)
            .await?
            .ok_or_else(|| CirculationError::not_found("Book", book_id))?;

        if session.member(member_id).await?.is_none() {
            return Err(CirculationError::not_found("Member", member_id));
        }

        if let Err(e) = inventory::decrement(&mut book) {
            warn!(copies_total = book.copies_total, "Borrow rejected: no copies available");
            return Err(e.into());
        }

        session.save_book_counts(&book).await?;
        session.insert_loan(&loan).await?;
        session.commit().await?;

        info!(
            loan_id = %loan.id,
            due_at = %loan.due_at,
            copies_available = book.copies_available,
            "Book borrowed"
        );
        Ok(loan)
    }

    /// Closes a loan, finalizes its fine, and puts the copy back
    ///
    /// The already-returned check and the close happen under the loan's row
    /// lock; a second return of the same loan is rejected, never credited.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the loan, or the book it refers to, does not exist
    /// - `AlreadyReturned` if the loan is closed
    /// - `InvalidArgument` for a negative or oversized `fine_per_day`, or a
    ///   fine larger than [`crate::MAX_FINE`]
    #[instrument(skip_all, fields(loan_id = %loan_id, fine_per_day = ?fine_per_day))]
    pub async fn return_book(
        &self,
        loan_id: LoanId,
        fine_per_day: Option<Decimal>,
    ) -> Result<Loan, CirculationError> {
        let rate = self.policy.fines.resolve(fine_per_day)?;
        let mut session = self.store.begin().await?;

        let mut loan = session
            .loan_for_update(loan_id)
            .await?
            .ok_or_else(|| CirculationError::not_found("Loan", loan_id))?;

        if loan.is_returned() {
            warn!(returned_at = ?loan.returned_at, "Return rejected: loan already closed");
            return Err(CirculationError::AlreadyReturned { loan_id });
        }

        let returned_at = self.clock.now();
        let fine = compute_fine(loan.due_at, returned_at, rate)?;
        loan.close(returned_at, fine)?;

        let mut book = session
            .book_for_update(loan.book_id)
            .await?
            .ok_or_else(|| CirculationError::not_found("Book", loan.book_id))?;
        inventory::increment(&mut book);

        session.save_book_counts(&book).await?;
        session.close_loan(&loan).await?;
        session.commit().await?;

        info!(
            book_id = %book.id,
            fine = %loan.fine,
            copies_available = book.copies_available,
            "Book returned"
        );
        Ok(loan)
    }

    /// Projects a loan for display at the service clock's current time
    pub fn view(&self, loan: Loan) -> LoanView {
        LoanView::project(loan, self.clock.now(), &self.policy.fines)
    }

    /// Lists every loan with its status and displayable fine
    pub async fn list_loans(&self) -> Result<Vec<LoanView>, CirculationError> {
        let now = self.clock.now();
        let loans = self.store.list_loans().await?;
        Ok(loans
            .into_iter()
            .map(|loan| LoanView::project(loan, now, &self.policy.fines))
            .collect())
    }

    pub async fn get_loan(&self, id: LoanId) -> Result<LoanView, CirculationError> {
        let loan = self.store.get_loan(id).await?;
        Ok(self.view(loan))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn add_book(&self, new: NewBook) -> Result<Book, CirculationError> {
        let book = Book::create(new)?;
        let stored = self.store.insert_book(&book).await?;
        info!(book_id = %stored.id, copies_total = stored.copies_total, "Book added");
        Ok(stored)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, CirculationError> {
        Ok(self.store.get_book(id).await?)
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, CirculationError> {
        Ok(self.store.list_books().await?)
    }

    /// Applies a partial update; an empty patch returns the book unchanged
    #[instrument(skip(self, patch), fields(book_id = %id))]
    pub async fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Book, CirculationError> {
        patch.validate()?;
        if patch.is_empty() {
            debug!("Empty patch, nothing to update");
            return self.get_book(id).await;
        }
        Ok(self.store.update_book(id, &patch).await?)
    }

    #[instrument(skip(self), fields(book_id = %id))]
    pub async fn delete_book(&self, id: BookId) -> Result<(), CirculationError> {
        self.store.delete_book(id).await?;
        info!("Book deleted");
        Ok(())
    }

    // ========================================================================
    // Members
    // ========================================================================

    #[instrument(skip(self, new))]
    pub async fn add_member(&self, new: NewMember) -> Result<Member, CirculationError> {
        let member = Member::create(new)?;
        let stored = self.store.insert_member(&member).await?;
        info!(member_id = %stored.id, "Member added");
        Ok(stored)
    }

    pub async fn get_member(&self, id: MemberId) -> Result<Member, CirculationError> {
        Ok(self.store.get_member(id).await?)
    }

    pub async fn list_members(&self) -> Result<Vec<Member>, CirculationError> {
        Ok(self.store.list_members().await?)
    }

    #[instrument(skip(self, patch), fields(member_id = %id))]
    pub async fn update_member(
        &self,
        id: MemberId,
        patch: MemberPatch,
    ) -> Result<Member, CirculationError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get_member(id).await;
        }
        Ok(self.store.update_member(id, &patch).await?)
    }

    #[instrument(skip(self), fields(member_id = %id))]
    pub async fn delete_member(&self, id: MemberId) -> Result<(), CirculationError> {
        self.store.delete_member(id).await?;
        info!("Member deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_policy_due_days() {
        let policy = CirculationPolicy::default();
        assert_eq!(policy.due_days(None), 7);
        assert_eq!(policy.due_days(Some(0)), 7);
        assert_eq!(policy.due_days(Some(-4)), 7);
        assert_eq!(policy.due_days(Some(14)), 14);
    }

    #[test]
    fn test_policy_validation() {
        assert!(CirculationPolicy::new(0, dec!(1)).is_err());
        assert!(CirculationPolicy::new(7, dec!(-1)).is_err());
        let policy = CirculationPolicy::new(21, dec!(0.50)).unwrap();
        assert_eq!(policy.default_due_days(), 21);
        assert_eq!(policy.fines().rate_per_day(), dec!(0.50));
    }
}
