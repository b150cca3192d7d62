//! Database connection pool management.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use ts_core::PostgresConfig;

use crate::error::{ResetError, ResetResult};

/// Pool sizing for a reset run.
///
/// Timeouts stay at the driver defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of connections.
    pub max_connections: u32,
    /// Minimum number of connections.
    pub min_connections: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            min_connections: 0,
        }
    }
}

/// Connect options for `config`, set field by field.
#[must_use]
pub fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.username)
        .password(&config.password)
}

/// `host:port/database`, used in logs and errors.
#[must_use]
pub fn target(config: &PostgresConfig) -> String {
    format!("{}:{}/{}", config.host, config.port, config.database)
}

/// Creates a `PostgreSQL` connection pool and checks that it can connect.
///
/// # Errors
///
/// Returns `ResetError::Connection` if no connection can be established.
pub async fn create_pool(config: &PostgresConfig, pool: &PoolConfig) -> ResetResult<PgPool> {
    tracing::debug!("Connecting to {} as '{}'", target(config), config.username);

    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .connect_with(connect_options(config))
        .await
        .map_err(|source| ResetError::Connection {
            target: target(config),
            source,
        })
}
