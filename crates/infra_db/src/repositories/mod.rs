//! Repository implementations for circulation records
//!
//! Each repository owns the SQL for one table and maps rows to plain
//! `FromRow` structs. Pool-backed methods serve single-statement reads and
//! writes; the associated functions taking a `&mut PgConnection` run inside a
//! caller's transaction so a session can lock rows and write them back
//! before committing.
//!
//! Queries are built at runtime (`sqlx::query_as::<_, Row>`), so the crate
//! compiles without a live database.

pub mod book;
pub mod member;
pub mod loan;

pub use book::{BookRepository, BookRow};
pub use member::{MemberRepository, MemberRow};
pub use loan::{LoanRepository, LoanRow};
