//! Test Utilities Crate
//!
//! Shared test infrastructure for the library circulation test suite.
//!
//! # Modules
//!
//! - `fixtures`: fixed dates, rates, and a ready-wired in-memory service
//! - `builders`: builders for books and members with sensible defaults
//! - `database`: PostgreSQL test container management
//! - `generators`: proptest strategies for circulation inputs

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use generators::*;
