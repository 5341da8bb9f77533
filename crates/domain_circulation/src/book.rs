//! Book records and catalog patches
//!
//! Catalog management creates, edits, and deletes books. The circulation
//! engine only ever touches `copies_available`, through the inventory ledger.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::BookId;

use crate::error::CirculationError;
use crate::inventory;

/// A title held by the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier
    pub id: BookId,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// ISBN as supplied by the cataloguer
    pub isbn: String,
    /// Copies owned
    pub copies_total: i32,
    /// Copies currently on the shelf
    pub copies_available: i32,
}

impl Book {
    /// Creates a book record from a validated request
    pub fn create(new: NewBook) -> Result<Self, CirculationError> {
        new.validate()?;
        inventory::check_counts(new.copies_total, new.copies_available)?;

        Ok(Self {
            id: BookId::new_v7(),
            title: new.title,
            author: new.author,
            isbn: new.isbn,
            copies_total: new.copies_total,
            copies_available: new.copies_available,
        })
    }

    /// Number of copies currently out on loan
    pub fn copies_on_loan(&self) -> i32 {
        self.copies_total - self.copies_available
    }

    /// Returns true if at least one copy can be borrowed
    pub fn is_available(&self) -> bool {
        self.copies_available > 0
    }

    /// Applies a patch in place
    ///
    /// Returns true if any field changed. Counts are not re-validated here;
    /// callers run [`inventory::check_counts`] on the result.
    pub fn apply(&mut self, patch: &BookPatch) -> bool {
        let mut changed = false;

        if let Some(title) = &patch.title {
            if *title != self.title {
                self.title = title.clone();
                changed = true;
            }
        }
        if let Some(author) = &patch.author {
            if *author != self.author {
                self.author = author.clone();
                changed = true;
            }
        }
        if let Some(isbn) = &patch.isbn {
            if *isbn != self.isbn {
                self.isbn = isbn.clone();
                changed = true;
            }
        }
        if let Some(total) = patch.copies_total {
            if total != self.copies_total {
                self.copies_total = total;
                changed = true;
            }
        }
        if let Some(available) = patch.copies_available {
            if available != self.copies_available {
                self.copies_available = available;
                changed = true;
            }
        }

        changed
    }
}

/// Request to add a book to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[validate(range(min = 0, message = "copies_total must not be negative"))]
    pub copies_total: i32,
    #[validate(range(min = 0, message = "copies_available must not be negative"))]
    pub copies_available: i32,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        copies_total: i32,
        copies_available: i32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            copies_total,
            copies_available,
        }
    }
}

/// Partial update of a book
///
/// `None` leaves a field untouched; `Some("")` really sets an empty string
/// (and is then rejected for `title`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookPatch {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "copies_total must not be negative"))]
    pub copies_total: Option<i32>,
    #[validate(range(min = 0, message = "copies_available must not be negative"))]
    pub copies_available: Option<i32>,
}

impl BookPatch {
    /// Returns true if the patch supplies no fields
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.copies_total.is_none()
            && self.copies_available.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book::create(NewBook::new("Dune", "Frank Herbert", "9780441013593", 3, 2)).unwrap()
    }

    #[test]
    fn test_create_book() {
        let book = sample();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.copies_on_loan(), 1);
        assert!(book.is_available());
    }

    #[test]
    fn test_create_rejects_negative_total() {
        let result = Book::create(NewBook::new("Dune", "Frank Herbert", "x", -1, 0));
        assert!(matches!(result, Err(CirculationError::InvalidArgument(_))));
    }

    #[test]
    fn test_create_rejects_available_above_total() {
        let result = Book::create(NewBook::new("Dune", "Frank Herbert", "x", 1, 2));
        assert!(matches!(result, Err(CirculationError::InvalidArgument(_))));
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let result = Book::create(NewBook::new("", "Frank Herbert", "x", 1, 1));
        assert!(matches!(result, Err(CirculationError::InvalidArgument(_))));
    }

    #[test]
    fn test_apply_only_supplied_fields() {
        let mut book = sample();
        let patch = BookPatch {
            author: Some("F. Herbert".to_string()),
            ..Default::default()
        };
        assert!(book.apply(&patch));
        assert_eq!(book.author, "F. Herbert");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.copies_total, 3);
    }

    #[test]
    fn test_apply_same_value_is_not_a_change() {
        let mut book = sample();
        let patch = BookPatch {
            title: Some("Dune".to_string()),
            ..Default::default()
        };
        assert!(!book.apply(&patch));
    }

    #[test]
    fn test_apply_empty_string_is_a_change() {
        let mut book = sample();
        let patch = BookPatch {
            isbn: Some(String::new()),
            ..Default::default()
        };
        assert!(book.apply(&patch));
        assert_eq!(book.isbn, "");
    }

    #[test]
    fn test_patch_validation() {
        let patch = BookPatch {
            copies_total: Some(-3),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(BookPatch::default().is_empty());
    }
}
