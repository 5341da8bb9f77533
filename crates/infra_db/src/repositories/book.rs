//! Book repository
//!
//! Inside a session `copies_available` only moves one copy at a time, through
//! [`BookRepository::decrement_available`] and
//! [`BookRepository::increment_available`]; otherwise only a catalog patch
//! writes it. The `books_copies_in_range` check
//! constraint backs the `0 <= available <= total` invariant.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use domain_circulation::{Book, BookPatch};

use crate::error::DatabaseError;

/// A row of the `books` table
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies_total: i32,
    pub copies_available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.book_id.into(),
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            copies_total: row.copies_total,
            copies_available: row.copies_available,
        }
    }
}

/// Repository for the `books` table
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new book
    pub async fn insert(&self, book: &Book) -> Result<BookRow, DatabaseError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (book_id, title, author, isbn, copies_total, copies_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING book_id, title, author, isbn, copies_total, copies_available,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::from(book.id))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.copies_total)
        .bind(book.copies_available)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get(&self, book_id: Uuid) -> Result<Option<BookRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT book_id, title, author, isbn, copies_total, copies_available,
                   created_at, updated_at
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists all books in creation order
    pub async fn list(&self) -> Result<Vec<BookRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT book_id, title, author, isbn, copies_total, copies_available,
                   created_at, updated_at
            FROM books
            ORDER BY created_at, book_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Applies a patch in a single statement
    ///
    /// Absent fields keep their stored value. A result that breaks the copy
    /// counts is rejected by the check constraint and nothing is written.
    pub async fn update(
        &self,
        book_id: Uuid,
        patch: &BookPatch,
    ) -> Result<Option<BookRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title            = COALESCE($2, title),
                author           = COALESCE($3, author),
                isbn             = COALESCE($4, isbn),
                copies_total     = COALESCE($5, copies_total),
                copies_available = COALESCE($6, copies_available),
                updated_at       = now()
            WHERE book_id = $1
            RETURNING book_id, title, author, isbn, copies_total, copies_available,
                      created_at, updated_at
            "#,
        )
        .bind(book_id)
        .bind(patch.title.as_deref())
        .bind(patch.author.as_deref())
        .bind(patch.isbn.as_deref())
        .bind(patch.copies_total)
        .bind(patch.copies_available)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Deletes a book, returning false if it did not exist
    pub async fn delete(&self, book_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads a book and holds its row lock until the transaction ends
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        book_id: Uuid,
    ) -> Result<Option<BookRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT book_id, title, author, isbn, copies_total, copies_available,
                   created_at, updated_at
            FROM books
            WHERE book_id = $1
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Takes one copy off the shelf
    ///
    /// Returns the new count, or `None` when no copy is available (or the
    /// book is gone) and nothing was written.
    pub async fn decrement_available(
        conn: &mut PgConnection,
        book_id: Uuid,
    ) -> Result<Option<i32>, DatabaseError> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books
            SET copies_available = copies_available - 1, updated_at = now()
            WHERE book_id = $1 AND copies_available > 0
            RETURNING copies_available
            "#,
        )
        .bind(book_id)
        .fetch_optional(conn)
        .await?;

        Ok(count)
    }

    /// Puts one copy back on the shelf
    ///
    /// Returns the new count, or `None` when every copy is already on the
    /// shelf (or the book is gone) and nothing was written.
    pub async fn increment_available(
        conn: &mut PgConnection,
        book_id: Uuid,
    ) -> Result<Option<i32>, DatabaseError> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books
            SET copies_available = copies_available + 1, updated_at = now()
            WHERE book_id = $1 AND copies_available < copies_total
            RETURNING copies_available
            "#,
        )
        .bind(book_id)
        .fetch_optional(conn)
        .await?;

        Ok(count)
    }
}
