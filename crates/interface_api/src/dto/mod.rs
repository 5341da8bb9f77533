//! Request and response bodies

pub mod book;
pub mod member;
pub mod loan;
