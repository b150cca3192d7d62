//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// An override did not parse, or the config file is unreadable.
    #[error("configuration error: {0}")]
    Config(#[from] ts_core::ConfigError),

    /// Provisioning aborted.
    #[error(transparent)]
    Provision(#[from] ts_keycloak::ProvisionError),

    /// A standalone admin call failed.
    #[error("keycloak error: {0}")]
    Keycloak(#[from] ts_keycloak::KeycloakError),

    /// The database reset failed.
    #[error("database reset failed: {0}")]
    Reset(#[from] ts_postgres::ResetError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
