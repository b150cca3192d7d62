//! Configuration errors.
//!
//! Every variant is fatal: a fixture that cannot be fully resolved must not
//! reach the provisioners, so resolution fails before any network I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while resolving a fixture specification.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An override was supplied but could not be parsed for its field.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Override key that carried the value.
        key: &'static str,
        /// Raw value as supplied.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An override file could not be read.
    #[error("failed to read override file {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An override file is not a flat TOML table of scalars.
    #[error("failed to parse override file {}: {message}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error for the given key.
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
