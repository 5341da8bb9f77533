//! Circulation Domain
//!
//! This crate implements the circulation engine of the library: how book
//! availability, loan records, and fines evolve as borrow and return
//! operations run concurrently against shared inventory.
//!
//! # Key Concepts
//!
//! - **Book**: a title with `copies_total` owned and `copies_available` on the shelf
//! - **Member**: a patron who can borrow books
//! - **Loan**: one copy borrowed by one member, active until returned
//! - **Inventory Ledger**: the only code allowed to move `copies_available`
//! - **Fine Policy**: overdue fines in whole days times a per-day rate
//!
//! # Consistency
//!
//! Borrow and return run inside a [`ports::StoreSession`], which holds an
//! exclusive lock on the rows it reads for update. The ledger check, the
//! counter write, and the loan write therefore commit together or not at all.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_circulation::{CirculationService, InMemoryStore, NewBook};
//!
//! let service = CirculationService::new(Arc::new(InMemoryStore::new()));
//! let book = service.add_book(NewBook::new("Dune", "Frank Herbert", "9780441013593", 2, 2)).await?;
//! let loan = service.borrow_book(book.id, member.id, None).await?;
//! ```

pub mod book;
pub mod member;
pub mod loan;
pub mod inventory;
pub mod fine;
pub mod ports;
pub mod service;
pub mod memory;
pub mod error;

pub use book::{Book, NewBook, BookPatch};
pub use member::{Member, NewMember, MemberPatch};
pub use loan::{Loan, LoanStatus, LoanView};
pub use inventory::LedgerError;
pub use fine::{FinePolicy, compute_fine, whole_days_late};
pub use ports::{CirculationStore, StoreSession};
pub use service::{CirculationService, CirculationPolicy};
pub use memory::InMemoryStore;
pub use error::CirculationError;

use rust_decimal::Decimal;

/// Due period applied when the caller does not supply a positive one
pub const DEFAULT_DUE_DAYS: i64 = 7;

/// Monetary amounts are kept to cents
pub const MONEY_PRECISION: u32 = 2;

/// Largest fine a loan can carry, 9,999,999,999.99 (the `NUMERIC(12,2)` column)
pub const MAX_FINE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_PRECISION);
