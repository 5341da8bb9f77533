//! PostgreSQL Circulation Adapter
//!
//! Implements the `CirculationStore` port with the book, member, and loan
//! repositories.
//!
//! # Sessions
//!
//! [`PostgresCirculationStore::begin`] opens a database transaction. Reads
//! "for update" take row locks that are held until the session commits or
//! is dropped; dropping an uncommitted `sqlx::Transaction` rolls it back.
//! Counter writes are conditional UPDATEs (`copies_available > 0` to lend,
//! `copies_available < copies_total` to return); a write that matches no row
//! fails the session with `PortError::Conflict`.
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - missing rows -> `PortError::NotFound`
//! - check constraint violations -> `PortError::Validation`
//! - unique violations and rejected counter writes -> `PortError::Conflict`
//! - connection failures -> `PortError::Connection`
//! - anything else -> `PortError::Internal`

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    BookId, DomainPort, HealthCheckResult, HealthCheckable, LoanId, MemberId,
    PortError,
};
use domain_circulation::{
    Book, BookPatch, CirculationStore, Loan, Member, MemberPatch, StoreSession,
};

use crate::error::DatabaseError;
use crate::repositories::{BookRepository, LoanRepository, MemberRepository};

const ADAPTER_ID: &str = "postgres-circulation-store";

/// PostgreSQL-backed implementation of the `CirculationStore` port
#[derive(Debug, Clone)]
pub struct PostgresCirculationStore {
    books: BookRepository,
    members: MemberRepository,
    loans: LoanRepository,
    pool: PgPool,
}

impl PostgresCirculationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            books: BookRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            loans: LoanRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresCirculationStore {}

#[async_trait]
impl HealthCheckable for PostgresCirculationStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl CirculationStore for PostgresCirculationStore {
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    async fn insert_book(&self, book: &Book) -> Result<Book, PortError> {
        debug!("Inserting book");
        Ok(self.books.insert(book).await?.into())
    }

    #[instrument(skip(self), fields(book_id = %id))]
    async fn get_book(&self, id: BookId) -> Result<Book, PortError> {
        self.books
            .get(id.into())
            .await?
            .map(Book::from)
            .ok_or_else(|| PortError::not_found("Book", id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, PortError> {
        let rows = self.books.list().await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self, patch), fields(book_id = %id))]
    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book, PortError> {
        debug!("Updating book");
        self.books
            .update(id.into(), patch)
            .await?
            .map(Book::from)
            .ok_or_else(|| PortError::not_found("Book", id))
    }

    #[instrument(skip(self), fields(book_id = %id))]
    async fn delete_book(&self, id: BookId) -> Result<(), PortError> {
        if !self.books.delete(id.into()).await? {
            return Err(PortError::not_found("Book", id));
        }
        Ok(())
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn insert_member(&self, member: &Member) -> Result<Member, PortError> {
        debug!("Inserting member");
        Ok(self.members.insert(member).await?.into())
    }

    #[instrument(skip(self), fields(member_id = %id))]
    async fn get_member(&self, id: MemberId) -> Result<Member, PortError> {
        self.members
            .get(id.into())
            .await?
            .map(Member::from)
            .ok_or_else(|| PortError::not_found("Member", id))
    }

    async fn list_members(&self) -> Result<Vec<Member>, PortError> {
        let rows = self.members.list().await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self, patch), fields(member_id = %id))]
    async fn update_member(&self, id: MemberId, patch: &MemberPatch) -> Result<Member, PortError> {
        debug!("Updating member");
        self.members
            .update(id.into(), patch)
            .await?
            .map(Member::from)
            .ok_or_else(|| PortError::not_found("Member", id))
    }

    #[instrument(skip(self), fields(member_id = %id))]
    async fn delete_member(&self, id: MemberId) -> Result<(), PortError> {
        if !self.members.delete(id.into()).await? {
            return Err(PortError::not_found("Member", id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(loan_id = %id))]
    async fn get_loan(&self, id: LoanId) -> Result<Loan, PortError> {
        self.loans
            .get(id.into())
            .await?
            .map(Loan::from)
            .ok_or_else(|| PortError::not_found("Loan", id))
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, PortError> {
        let rows = self.loans.list().await?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn begin(&self) -> Result<Box<dyn StoreSession>, PortError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        debug!("Session opened");
        Ok(Box::new(PgSession {
            tx,
            locked_counts: HashMap::new(),
        }))
    }
}

/// A database transaction behind the `StoreSession` port
///
/// Remembers the available count of every book it locked, so a counter write
/// can be issued as a guarded one-copy move.
struct PgSession {
    tx: Transaction<'static, Postgres>,
    locked_counts: HashMap<BookId, i32>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn book_for_update(&mut self, id: BookId) -> Result<Option<Book>, PortError> {
        let row = BookRepository::lock_for_update(&mut *self.tx, id.into()).await?;
        let book = row.map(Book::from);
        if let Some(book) = &book {
            self.locked_counts.insert(book.id, book.copies_available);
        }
        Ok(book)
    }

    async fn member(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
        let row = MemberRepository::find(&mut *self.tx, id.into()).await?;
        Ok(row.map(Member::from))
    }

    async fn loan_for_update(&mut self, id: LoanId) -> Result<Option<Loan>, PortError> {
        let row = LoanRepository::lock_for_update(&mut *self.tx, id.into()).await?;
        Ok(row.map(Loan::from))
    }

    async fn save_book_counts(&mut self, book: &Book) -> Result<(), PortError> {
        let locked = *self.locked_counts.get(&book.id).ok_or_else(|| {
            PortError::internal(format!("book {} was not read for update", book.id))
        })?;

        let written = match book.copies_available - locked {
            0 => return Ok(()),
            -1 => BookRepository::decrement_available(&mut *self.tx, book.id.into())
                .await?
                .ok_or_else(|| PortError::conflict(format!("no copies of {} available", book.id)))?,
            1 => BookRepository::increment_available(&mut *self.tx, book.id.into())
                .await?
                .ok_or_else(|| {
                    PortError::conflict(format!("every copy of {} is already on the shelf", book.id))
                })?,
            delta => {
                return Err(PortError::internal(format!(
                    "copies_available of {} moved by {} in one session",
                    book.id, delta
                )))
            }
        };

        self.locked_counts.insert(book.id, written);
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &Loan) -> Result<(), PortError> {
        LoanRepository::insert(&mut *self.tx, loan).await?;
        Ok(())
    }

    async fn close_loan(&mut self, loan: &Loan) -> Result<(), PortError> {
        let returned_at = loan
            .returned_at
            .ok_or_else(|| PortError::internal(format!("loan {} has no return time", loan.id)))?;
        LoanRepository::close(&mut *self.tx, Uuid::from(loan.id), returned_at, loan.fine).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        debug!("Session committed");
        Ok(())
    }
}
