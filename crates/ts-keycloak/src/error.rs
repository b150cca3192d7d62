//! Keycloak error types.

use std::fmt;

use thiserror::Error;

/// Errors raised by the admin transport and session.
#[derive(Debug, Error)]
pub enum KeycloakError {
    /// The server could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The administrator password grant was rejected.
    #[error("authentication failed with status {status}: {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// An admin API call returned a non-success status.
    #[error("{method} {path} failed with status {status}: {message}")]
    Api {
        /// HTTP method.
        method: &'static str,
        /// Request path relative to the server URL.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A create call succeeded without telling us the new identifier.
    #[error("{resource} was created but the response carried no Location header")]
    MissingLocation {
        /// Kind of resource that was created.
        resource: &'static str,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias using [`KeycloakError`].
pub type KeycloakResult<T> = Result<T, KeycloakError>;

/// Provisioning step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    /// Administrator authentication.
    Connect,
    /// Realm recreation.
    Realm,
    /// Client creation.
    Client,
    /// User recreation and password.
    User,
    /// Role recreation and assignment.
    Role,
}

impl ProvisionStep {
    /// Every step in execution order.
    pub const ALL: [Self; 5] = [Self::Connect, Self::Realm, Self::Client, Self::User, Self::Role];

    /// Lowercase step name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Realm => "realm",
            Self::Client => "client",
            Self::User => "user",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisioning run aborted at `step`.
///
/// Steps already completed are not rolled back: a failure after the realm
/// was deleted leaves the server without that realm.
#[derive(Debug, Error)]
#[error("provisioning aborted at step '{step}': {source}")]
pub struct ProvisionError {
    /// Step that failed.
    pub step: ProvisionStep,
    /// Underlying failure.
    #[source]
    pub source: KeycloakError,
}

impl ProvisionError {
    /// Creates an error for `step`.
    #[must_use]
    pub fn new(step: ProvisionStep, source: KeycloakError) -> Self {
        Self { step, source }
    }

    /// Returns a closure tagging a [`KeycloakError`] with `step`, for `map_err`.
    pub fn at(step: ProvisionStep) -> impl FnOnce(KeycloakError) -> Self {
        move |source| Self::new(step, source)
    }

    /// Whether the session could not be established at all.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        self.step == ProvisionStep::Connect
    }

    /// Whether a reconciliation call against an established session failed.
    #[must_use]
    pub fn is_reconciliation_error(&self) -> bool {
        !self.is_connection_error()
    }
}
