//! Inventory ledger
//!
//! The ledger is the only place `copies_available` moves. It enforces
//! `0 <= copies_available <= copies_total` for every adjustment; the caller
//! holds the book row lock and persists the result in the same session.

use thiserror::Error;
use tracing::error;

use core_kernel::BookId;

use crate::book::Book;

/// Errors raised by ledger adjustments
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("No copies of {book_id} available")]
    Unavailable { book_id: BookId },

    #[error("Invalid copy counts: {0}")]
    InvalidCounts(String),
}

/// Takes one copy off the shelf
///
/// Returns the new `copies_available`.
pub fn decrement(book: &mut Book) -> Result<i32, LedgerError> {
    if book.copies_available < 1 {
        return Err(LedgerError::Unavailable { book_id: book.id });
    }
    book.copies_available -= 1;
    Ok(book.copies_available)
}

/// Puts one copy back on the shelf
///
/// A count that would pass `copies_total` means loans and inventory have
/// drifted apart. The count is clamped to `copies_total` and the drift is
/// logged as an invariant violation.
pub fn increment(book: &mut Book) -> i32 {
    if book.copies_available >= book.copies_total {
        error!(
            book_id = %book.id,
            copies_available = book.copies_available,
            copies_total = book.copies_total,
            "Inventory invariant violated: return would exceed copies_total, clamping"
        );
        book.copies_available = book.copies_total.max(0);
        return book.copies_available;
    }
    book.copies_available += 1;
    book.copies_available
}

/// Validates a pair of copy counts as supplied by catalog management
pub fn check_counts(copies_total: i32, copies_available: i32) -> Result<(), LedgerError> {
    if copies_total < 0 {
        return Err(LedgerError::InvalidCounts(format!(
            "copies_total must not be negative (got {})",
            copies_total
        )));
    }
    if copies_available < 0 {
        return Err(LedgerError::InvalidCounts(format!(
            "copies_available must not be negative (got {})",
            copies_available
        )));
    }
    if copies_available > copies_total {
        return Err(LedgerError::InvalidCounts(format!(
            "copies_available ({}) must not exceed copies_total ({})",
            copies_available, copies_total
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::NewBook;

    fn book(total: i32, available: i32) -> Book {
        Book::create(NewBook::new("Emma", "Jane Austen", "9780141439587", total, available)).unwrap()
    }

    #[test]
    fn test_decrement() {
        let mut b = book(2, 2);
        assert_eq!(decrement(&mut b), Ok(1));
        assert_eq!(decrement(&mut b), Ok(0));
        assert_eq!(decrement(&mut b), Err(LedgerError::Unavailable { book_id: b.id }));
        assert_eq!(b.copies_available, 0);
    }

    #[test]
    fn test_increment() {
        let mut b = book(2, 0);
        assert_eq!(increment(&mut b), 1);
        assert_eq!(increment(&mut b), 2);
    }

    #[test]
    fn test_increment_clamps_at_total() {
        let mut b = book(2, 2);
        assert_eq!(increment(&mut b), 2);
        assert_eq!(b.copies_available, 2);
    }

    #[test]
    fn test_check_counts() {
        assert!(check_counts(0, 0).is_ok());
        assert!(check_counts(3, 3).is_ok());
        assert!(check_counts(-1, 0).is_err());
        assert!(check_counts(1, -1).is_err());
        assert!(check_counts(1, 2).is_err());
    }
}
