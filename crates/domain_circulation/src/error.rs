//! Circulation domain errors

use thiserror::Error;

use core_kernel::{BookId, LoanId, PortError};

use crate::inventory::LedgerError;

/// Errors reported by circulation operations
#[derive(Debug, Error)]
pub enum CirculationError {
    /// The requested book, member, or loan does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// The book exists but every copy is on loan
    #[error("Book unavailable: no copies of {book_id} are available")]
    BookUnavailable {
        book_id: BookId,
    },

    /// The loan has already been closed
    #[error("Loan already returned: {loan_id}")]
    AlreadyReturned {
        loan_id: LoanId,
    },

    /// Malformed input (negative counts, empty names, bad email)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage or unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CirculationError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        CirculationError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CirculationError::InvalidArgument(message.into())
    }
}

impl From<PortError> for CirculationError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => CirculationError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation { message, field } => match field {
                Some(field) => CirculationError::InvalidArgument(format!("{}: {}", field, message)),
                None => CirculationError::InvalidArgument(message),
            },
            other => CirculationError::Internal(other.to_string()),
        }
    }
}

impl From<LedgerError> for CirculationError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unavailable { book_id } => CirculationError::BookUnavailable { book_id },
            LedgerError::InvalidCounts(message) => CirculationError::InvalidArgument(message),
        }
    }
}

impl From<validator::ValidationErrors> for CirculationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CirculationError::InvalidArgument(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_keeps_entity() {
        let error: CirculationError = PortError::not_found("Loan", "LN-1").into();
        assert!(matches!(
            error,
            CirculationError::NotFound { ref entity, ref id } if entity == "Loan" && id == "LN-1"
        ));
    }

    #[test]
    fn test_port_connection_is_internal() {
        let error: CirculationError = PortError::connection("pool closed").into();
        assert!(matches!(error, CirculationError::Internal(_)));
    }

    #[test]
    fn test_ledger_unavailable_maps_to_book_unavailable() {
        let book_id = BookId::new();
        let error: CirculationError = LedgerError::Unavailable { book_id }.into();
        assert!(matches!(error, CirculationError::BookUnavailable { book_id: b } if b == book_id));
    }
}
