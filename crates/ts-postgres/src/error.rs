//! Database reset error types.

use thiserror::Error;

/// Errors raised while resetting the database.
#[derive(Debug, Error)]
pub enum ResetError {
    /// The database could not be reached or rejected the credentials.
    #[error("could not connect to {target}: {source}")]
    Connection {
        /// `host:port/database` that was dialled.
        target: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Dropping the schema objects failed.
    #[error("clean failed: {0}")]
    Clean(#[source] sqlx::Error),

    /// Loading or applying the migration set failed.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl ResetError {
    /// Whether the failure happened before any statement ran.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type alias using [`ResetError`].
pub type ResetResult<T> = Result<T, ResetError>;
