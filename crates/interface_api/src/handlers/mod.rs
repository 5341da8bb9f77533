//! Request handlers

pub mod health;
pub mod books;
pub mod members;
pub mod loans;
