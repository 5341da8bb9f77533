//! Domain Adapters
//!
//! Adapter implementations for domain ports, connecting the circulation
//! store port to the PostgreSQL repositories.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::adapters::PostgresCirculationStore;
//! use domain_circulation::CirculationService;
//!
//! let store = PostgresCirculationStore::new(pool);
//! let service = CirculationService::new(Arc::new(store));
//! ```

pub mod circulation;

pub use circulation::PostgresCirculationStore;
