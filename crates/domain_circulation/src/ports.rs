//! Record store port
//!
//! The circulation engine reads and writes through these traits. Adapters
//! provide the storage:
//!
//! - **PostgreSQL**: `infra_db::PostgresCirculationStore`
//! - **In-memory**: [`crate::memory::InMemoryStore`], for tests and demos
//!
//! # Atomicity
//!
//! Every method on [`CirculationStore`] is atomic on its own. Borrow and
//! return touch two records, so they run inside a [`StoreSession`]: rows read
//! "for update" stay exclusively locked until the session is committed or
//! dropped, and nothing written through the session is visible before
//! `commit`. Dropping a session without committing discards its writes.
//!
//! ```rust,ignore
//! let mut session = store.begin().await?;
//! let mut book = session.book_for_update(book_id).await?.ok_or(...)?;
//! inventory::decrement(&mut book)?;
//! session.save_book_counts(&book).await?;
//! session.insert_loan(&loan).await?;
//! session.commit().await?;
//! ```

use async_trait::async_trait;

use core_kernel::{BookId, DomainPort, HealthCheckable, LoanId, MemberId, PortError};

use crate::book::{Book, BookPatch};
use crate::loan::Loan;
use crate::member::{Member, MemberPatch};

/// Storage operations required by the circulation engine
#[async_trait]
pub trait CirculationStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Catalog
    // ========================================================================

    /// Stores a new book
    async fn insert_book(&self, book: &Book) -> Result<Book, PortError>;

    /// Retrieves a book, or `PortError::NotFound`
    async fn get_book(&self, id: BookId) -> Result<Book, PortError>;

    /// Lists all books in creation order
    async fn list_books(&self) -> Result<Vec<Book>, PortError>;

    /// Applies a patch in one write
    ///
    /// The resulting counts must satisfy `0 <= available <= total`, otherwise
    /// `PortError::Validation` and nothing is written.
    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book, PortError>;

    /// Deletes a book
    async fn delete_book(&self, id: BookId) -> Result<(), PortError>;

    // ========================================================================
    // Members
    // ========================================================================

    async fn insert_member(&self, member: &Member) -> Result<Member, PortError>;

    async fn get_member(&self, id: MemberId) -> Result<Member, PortError>;

    async fn list_members(&self) -> Result<Vec<Member>, PortError>;

    async fn update_member(&self, id: MemberId, patch: &MemberPatch) -> Result<Member, PortError>;

    async fn delete_member(&self, id: MemberId) -> Result<(), PortError>;

    // ========================================================================
    // Loans
    // ========================================================================

    async fn get_loan(&self, id: LoanId) -> Result<Loan, PortError>;

    /// Lists all loans in creation order
    async fn list_loans(&self) -> Result<Vec<Loan>, PortError>;

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Opens a session for a compound mutation
    async fn begin(&self) -> Result<Box<dyn StoreSession>, PortError>;
}

/// One storage transaction
#[async_trait]
pub trait StoreSession: Send {
    /// Reads a book and locks it until the session ends
    async fn book_for_update(&mut self, id: BookId) -> Result<Option<Book>, PortError>;

    /// Reads a member
    async fn member(&mut self, id: MemberId) -> Result<Option<Member>, PortError>;

    /// Reads a loan and locks it until the session ends
    async fn loan_for_update(&mut self, id: LoanId) -> Result<Option<Loan>, PortError>;

    /// Writes `copies_available` of a book previously read for update
    async fn save_book_counts(&mut self, book: &Book) -> Result<(), PortError>;

    /// Stages a new loan
    async fn insert_loan(&mut self, loan: &Loan) -> Result<(), PortError>;

    /// Writes `returned_at` and `fine` of a loan previously read for update
    async fn close_loan(&mut self, loan: &Loan) -> Result<(), PortError>;

    /// Makes every staged write visible at once
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}
