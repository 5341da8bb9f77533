//! In-memory record store
//!
//! A [`CirculationStore`] backed by ordered maps behind one async mutex. A
//! session holds the mutex for its whole lifetime, so sessions run one at a
//! time and every row read inside a session is effectively locked for update.
//! Writes are staged in the session and applied on `commit`; dropping the
//! session discards them.
//!
//! Used by the test suites and by the server when `LIBRARY_STORE=memory`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use core_kernel::{
    BookId, DomainPort, HealthCheckResult, HealthCheckable, LoanId, MemberId,
    PortError,
};

use crate::book::{Book, BookPatch};
use crate::inventory;
use crate::loan::Loan;
use crate::member::{Member, MemberPatch};
use crate::ports::{CirculationStore, StoreSession};

#[derive(Debug, Default)]
struct StoreState {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    loans: BTreeMap<LoanId, Loan>,
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_loan_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later loan write inside a session fail with `Internal`
    ///
    /// Lets tests force a failure after the inventory write has been staged.
    pub fn fail_loan_writes(&self, fail: bool) {
        self.fail_loan_writes.store(fail, Ordering::SeqCst);
    }
}

impl DomainPort for InMemoryStore {}

#[async_trait]
impl HealthCheckable for InMemoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-circulation-store", 0).with_message("In-memory store")
    }
}

fn validate_counts(book: &Book) -> Result<(), PortError> {
    inventory::check_counts(book.copies_total, book.copies_available)
        .map_err(|e| PortError::validation(e.to_string()))
}

#[async_trait]
impl CirculationStore for InMemoryStore {
    async fn insert_book(&self, book: &Book) -> Result<Book, PortError> {
        validate_counts(book)?;
        let mut state = self.state.lock().await;
        if state.books.contains_key(&book.id) {
            return Err(PortError::conflict(format!("Book {} already exists", book.id)));
        }
        state.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn get_book(&self, id: BookId) -> Result<Book, PortError> {
        let state = self.state.lock().await;
        state
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Book", id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, PortError> {
        let state = self.state.lock().await;
        Ok(state.books.values().cloned().collect())
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book, PortError> {
        let mut state = self.state.lock().await;
        let mut book = state
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Book", id))?;

        if book.apply(patch) {
            validate_counts(&book)?;
            state.books.insert(id, book.clone());
        }
        Ok(book)
    }

    async fn delete_book(&self, id: BookId) -> Result<(), PortError> {
        let mut state = self.state.lock().await;
        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Book", id))
    }

    async fn insert_member(&self, member: &Member) -> Result<Member, PortError> {
        let mut state = self.state.lock().await;
        if state.members.contains_key(&member.id) {
            return Err(PortError::conflict(format!("Member {} already exists", member.id)));
        }
        state.members.insert(member.id, member.clone());
        Ok(member.clone())
    }

    async fn get_member(&self, id: MemberId) -> Result<Member, PortError> {
        let state = self.state.lock().await;
        state
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Member", id))
    }

    async fn list_members(&self) -> Result<Vec<Member>, PortError> {
        let state = self.state.lock().await;
        Ok(state.members.values().cloned().collect())
    }

    async fn update_member(&self, id: MemberId, patch: &MemberPatch) -> Result<Member, PortError> {
        let mut state = self.state.lock().await;
        let member = state
            .members
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Member", id))?;
        member.apply(patch);
        Ok(member.clone())
    }

    async fn delete_member(&self, id: MemberId) -> Result<(), PortError> {
        let mut state = self.state.lock().await;
        state
            .members
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Member", id))
    }

    async fn get_loan(&self, id: LoanId) -> Result<Loan, PortError> {
        let state = self.state.lock().await;
        state
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Loan", id))
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, PortError> {
        let state = self.state.lock().await;
        Ok(state.loans.values().cloned().collect())
    }

    async fn begin(&self) -> Result<Box<dyn StoreSession>, PortError> {
        let state = self.state.clone().lock_owned().await;
        Ok(Box::new(MemorySession {
            state,
            books: HashMap::new(),
            loans: HashMap::new(),
            fail_loan_writes: self.fail_loan_writes.load(Ordering::SeqCst),
        }))
    }
}

/// A session over [`InMemoryStore`]
///
/// Holds the store mutex; staged writes live in `books` and `loans`.
struct MemorySession {
    state: OwnedMutexGuard<StoreState>,
    books: HashMap<BookId, Book>,
    loans: HashMap<LoanId, Loan>,
    fail_loan_writes: bool,
}

impl MemorySession {
    fn current_book(&self, id: BookId) -> Option<Book> {
        self.books
            .get(&id)
            .or_else(|| self.state.books.get(&id))
            .cloned()
    }

    fn current_loan(&self, id: LoanId) -> Option<Loan> {
        self.loans
            .get(&id)
            .or_else(|| self.state.loans.get(&id))
            .cloned()
    }

    fn check_loan_writes(&self) -> Result<(), PortError> {
        if self.fail_loan_writes {
            return Err(PortError::internal("loan write rejected by store"));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn book_for_update(&mut self, id: BookId) -> Result<Option<Book>, PortError> {
        Ok(self.current_book(id))
    }

    async fn member(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
        Ok(self.state.members.get(&id).cloned())
    }

    async fn loan_for_update(&mut self, id: LoanId) -> Result<Option<Loan>, PortError> {
        Ok(self.current_loan(id))
    }

    async fn save_book_counts(&mut self, book: &Book) -> Result<(), PortError> {
        let mut current = self
            .current_book(book.id)
            .ok_or_else(|| PortError::not_found("Book", book.id))?;
        current.copies_available = book.copies_available;
        validate_counts(&current)?;
        self.books.insert(book.id, current);
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &Loan) -> Result<(), PortError> {
        self.check_loan_writes()?;
        if self.current_loan(loan.id).is_some() {
            return Err(PortError::conflict(format!("Loan {} already exists", loan.id)));
        }
        self.loans.insert(loan.id, loan.clone());
        Ok(())
    }

    async fn close_loan(&mut self, loan: &Loan) -> Result<(), PortError> {
        self.check_loan_writes()?;
        let mut current = self
            .current_loan(loan.id)
            .ok_or_else(|| PortError::not_found("Loan", loan.id))?;
        current.returned_at = loan.returned_at;
        current.fine = loan.fine;
        self.loans.insert(loan.id, current);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let MemorySession {
            mut state,
            books,
            loans,
            ..
        } = *self;
        state.books.extend(books);
        state.loans.extend(loans);
        Ok(())
    }
}
