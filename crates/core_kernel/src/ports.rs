//! Storage port contracts
//!
//! The circulation domain defines its store trait in `domain_circulation`;
//! this module holds the pieces every adapter shares: the error type it
//! reports through and the health probe the readiness endpoint calls.
//!
//! ```text
//!   HTTP handlers ──> CirculationService ──> dyn CirculationStore
//!                                                 │
//!                              ┌──────────────────┴─────────────────┐
//!                              ▼                                    ▼
//!                  PostgresCirculationStore                 InMemoryStore
//!                        (infra_db)                    (domain_circulation)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a storage adapter
///
/// Adapters translate their native errors into this type so the domain never
/// sees driver-specific detail.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// The write would break a stored invariant
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A record with the same identity already exists
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Store unreachable: {message}")]
    Connection { message: String },

    #[error("Timed out during {operation}")]
    Timeout { operation: String },

    #[error("Store failure: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        PortError::Timeout {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// True for failures a caller may reasonably retry
    ///
    /// Nothing in the circulation core retries; this is for front ends.
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. } | PortError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker for adapters shared across request tasks
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Outcome of one health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unhealthy(adapter_id: impl Into<String>, latency_ms: u64, message: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(message.into()),
            checked_at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// True when the adapter can serve requests
    pub fn is_available(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let error = PortError::not_found("Book", "BK-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "Book not found: BK-123");
    }

    #[test]
    fn test_transient_errors() {
        assert!(PortError::timeout("acquire connection").is_transient());
        assert!(PortError::connection("refused").is_transient());
        assert!(!PortError::validation("copies_total must be >= 0").is_transient());
        assert!(!PortError::conflict("duplicate").is_transient());
    }

    #[test]
    fn test_health_result_constructors() {
        let up = HealthCheckResult::healthy("memory", 0).with_message("in process");
        assert!(up.is_available());
        assert_eq!(up.message.as_deref(), Some("in process"));

        let down = HealthCheckResult::unhealthy("postgres", 12, "connection refused");
        assert!(!down.is_available());
        assert_eq!(down.status, AdapterHealth::Unhealthy);
    }
}
