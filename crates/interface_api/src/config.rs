//! API configuration
//!
//! Read from `LIBRARY_`-prefixed environment variables; every key is
//! optional and falls back to [`ApiConfig::default`].

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use domain_circulation::{CirculationError, CirculationPolicy, DEFAULT_DUE_DAYS};
use infra_db::DatabaseConfig;

/// Which record store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// PostgreSQL via `infra_db`
    #[default]
    Postgres,
    /// Process-local store; data is lost on exit
    Memory,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Pool size
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Loan period when a borrow does not specify one
    pub default_due_days: i64,
    /// Fine rate when a return does not specify one
    pub default_fine_per_day: Decimal,
    /// Record store backend
    pub store: StoreKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/library".to_string(),
            log_level: "info".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            default_due_days: DEFAULT_DUE_DAYS,
            default_fine_per_day: Decimal::ONE,
            store: StoreKind::Postgres,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `LIBRARY_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("LIBRARY"))
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Library-wide borrow and return defaults
    pub fn circulation_policy(&self) -> Result<CirculationPolicy, CirculationError> {
        CirculationPolicy::new(self.default_due_days, self.default_fine_per_day)
    }

    /// Pool settings for the PostgreSQL store
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}
