//! Book DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::BookId;
use domain_circulation::{Book, BookPatch, NewBook};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[validate(range(min = 0, message = "copies_total must not be negative"))]
    pub copies_total: i32,
    /// Defaults to `copies_total`
    #[validate(range(min = 0, message = "copies_available must not be negative"))]
    pub copies_available: Option<i32>,
}

impl From<CreateBookRequest> for NewBook {
    fn from(request: CreateBookRequest) -> Self {
        let available = request.copies_available.unwrap_or(request.copies_total);
        NewBook::new(
            request.title,
            request.author,
            request.isbn,
            request.copies_total,
            available,
        )
    }
}

/// Partial update; omitted fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "copies_total must not be negative"))]
    pub copies_total: Option<i32>,
    #[validate(range(min = 0, message = "copies_available must not be negative"))]
    pub copies_available: Option<i32>,
}

impl From<UpdateBookRequest> for BookPatch {
    fn from(request: UpdateBookRequest) -> Self {
        BookPatch {
            title: request.title,
            author: request.author,
            isbn: request.isbn,
            copies_total: request.copies_total,
            copies_available: request.copies_available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies_total: i32,
    pub copies_available: i32,
    pub copies_on_loan: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            copies_on_loan: book.copies_on_loan(),
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            copies_total: book.copies_total,
            copies_available: book.copies_available,
        }
    }
}
