//! Core Kernel - Foundational types shared by every library crate
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for books, members, and loans
//! - Port error and health-check contracts for storage adapters
//! - Clock abstraction for UTC timestamps

pub mod identifiers;
pub mod ports;
pub mod temporal;

pub use identifiers::{BookId, MemberId, LoanId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use temporal::{Clock, SystemClock, ManualClock};
