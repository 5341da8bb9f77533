//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the library circulation system, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL for
//! one table each, and [`adapters::PostgresCirculationStore`] implements the
//! domain's `CirculationStore` port on top of them.
//!
//! Borrow and return run in a database transaction that takes
//! `SELECT ... FOR UPDATE` row locks on the book (and loan), so concurrent
//! requests on the same record serialize at the database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresCirculationStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/library")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresCirculationStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresCirculationStore;
