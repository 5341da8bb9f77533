//! Library Circulation - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL at the default URL
//! cargo run --bin library-api
//!
//! # No database, data kept in memory
//! LIBRARY_STORE=memory cargo run --bin library-api
//! ```
//!
//! # Environment Variables
//!
//! * `LIBRARY_HOST` - Server host (default: 0.0.0.0)
//! * `LIBRARY_PORT` - Server port (default: 8080)
//! * `LIBRARY_DATABASE_URL` - PostgreSQL connection string
//! * `LIBRARY_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `LIBRARY_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `LIBRARY_DEFAULT_DUE_DAYS` - Loan period (default: 7)
//! * `LIBRARY_DEFAULT_FINE_PER_DAY` - Fine rate (default: 1.00)
//! * `LIBRARY_STORE` - `postgres` or `memory` (default: postgres)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use domain_circulation::{CirculationService, CirculationStore, InMemoryStore};
use infra_db::{create_pool, run_migrations, PostgresCirculationStore};
use interface_api::config::{ApiConfig, StoreKind};
use interface_api::create_router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid LIBRARY_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        "Starting library circulation API server"
    );

    let policy = config
        .circulation_policy()
        .context("invalid circulation defaults")?;
    let store = build_store(&config).await?;
    let service = CirculationService::new(store).with_policy(policy);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;
    let app = create_router(service, config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn CirculationStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; records are lost on shutdown");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreKind::Postgres => {
            let pool = create_pool(config.database_config())
                .await
                .context("could not connect to PostgreSQL")?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PostgresCirculationStore::new(pool)))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
