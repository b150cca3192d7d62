//! Fixture specification and its resolver.
//!
//! Every field resolves independently: a non-empty override wins, otherwise
//! the compile-time default in [`defaults`] applies. Resolution is total, so
//! [`FixtureSpec::resolve`] either returns a fully populated value or fails
//! before anything touches the network.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::source::OverrideSource;

/// Override keys understood by the resolver.
pub mod keys {
    /// Keycloak transport scheme.
    pub const KEYCLOAK_HOST_URI_SCHEMA: &str = "KEYCLOAK_HOST_URI_SCHEMA";
    /// Keycloak host.
    pub const KEYCLOAK_HOST: &str = "KEYCLOAK_HOST";
    /// Keycloak port.
    pub const KEYCLOAK_PORT: &str = "KEYCLOAK_PORT";
    /// Keycloak administrator username.
    pub const KEYCLOAK_USER: &str = "KEYCLOAK_USER";
    /// Keycloak administrator password.
    pub const KEYCLOAK_PASSWORD: &str = "KEYCLOAK_PASSWORD";
    /// Realm the administrator authenticates against.
    pub const KEYCLOAK_MASTER_REALM: &str = "KEYCLOAK_MASTER_REALM";
    /// Client used for the administrator password grant.
    pub const KEYCLOAK_ADMIN_CLIENT_ID: &str = "KEYCLOAK_ADMIN_CLIENT_ID";
    /// Provisioned client id.
    pub const KEYCLOAK_TEST_CLIENT_ID: &str = "KEYCLOAK_TEST_CLIENT_ID";
    /// Provisioned client secret.
    pub const KEYCLOAK_TEST_CLIENT_SECRET: &str = "KEYCLOAK_TEST_CLIENT_SECRET";
    /// Provisioned realm.
    pub const KEYCLOAK_TEST_REALM_NAME: &str = "KEYCLOAK_TEST_REALM_NAME";
    /// Provisioned realm role.
    pub const KEYCLOAK_TEST_USER_ROLE: &str = "KEYCLOAK_TEST_USER_ROLE";
    /// Provisioned realm role description.
    pub const KEYCLOAK_TEST_USER_ROLE_DESCRIPTION: &str = "KEYCLOAK_TEST_USER_ROLE_DESCRIPTION";
    /// Provisioned user.
    pub const KEYCLOAK_TEST_ADMIN_USERNAME: &str = "KEYCLOAK_TEST_ADMIN_USERNAME";
    /// Provisioned user's password.
    pub const KEYCLOAK_TEST_ADMIN_PASSWORD: &str = "KEYCLOAK_TEST_ADMIN_PASSWORD";

    /// Database host.
    pub const POSTGRES_HOST: &str = "POSTGRES_HOST";
    /// Database port.
    pub const POSTGRES_PORT: &str = "POSTGRES_PORT";
    /// Database name.
    pub const POSTGRES_DB: &str = "POSTGRES_DB";
    /// Database user.
    pub const POSTGRES_USER: &str = "POSTGRES_USER";
    /// Database password.
    pub const POSTGRES_PASSWORD: &str = "POSTGRES_PASSWORD";
    /// Run the destructive clean before migrating.
    pub const FLYWAY_CLEAN: &str = "FLYWAY_CLEAN";
    /// Run the forward migration.
    pub const FLYWAY_MIGRATE: &str = "FLYWAY_MIGRATE";
    /// Directory holding the migration scripts.
    pub const FLYWAY_LOCATIONS: &str = "FLYWAY_LOCATIONS";
}

/// Values used when no override is supplied.
pub mod defaults {
    /// Default Keycloak transport scheme.
    pub const URI_SCHEMA: &str = "http";
    /// Default Keycloak host.
    pub const KEYCLOAK_HOST: &str = "localhost";
    /// Default Keycloak port.
    pub const KEYCLOAK_PORT: u16 = 18080;
    /// Default administrator username.
    pub const ADMIN_USERNAME: &str = "admin";
    /// Default administrator password.
    pub const ADMIN_PASSWORD: &str = "admin";
    /// Default administrator realm.
    pub const MASTER_REALM: &str = "master";
    /// Default administrator client.
    pub const ADMIN_CLIENT_ID: &str = "admin-cli";
    /// Default provisioned client id.
    pub const TEST_CLIENT_ID: &str = "sb-client";
    /// Default provisioned client secret.
    pub const TEST_CLIENT_SECRET: &str = "ad0be000-0000-4000-a000-000000000000";
    /// Default provisioned realm.
    pub const TEST_REALM_NAME: &str = "sandbox";
    /// Default provisioned realm role.
    pub const TEST_USER_ROLE: &str = "sb-manager";
    /// Default provisioned realm role description.
    pub const TEST_USER_ROLE_DESCRIPTION: &str = "sandbox manager";
    /// Default provisioned username.
    pub const TEST_ADMIN_USERNAME: &str = "sb-admin";
    /// Default provisioned user's password.
    pub const TEST_ADMIN_PASSWORD: &str = "ThisIsHow2ConnectAnAdmin!";

    /// Default database host.
    pub const POSTGRES_HOST: &str = "localhost";
    /// Default database port.
    pub const POSTGRES_PORT: u16 = 35432;
    /// Default database name.
    pub const POSTGRES_DB: &str = "testsupport";
    /// Default database user.
    pub const POSTGRES_USER: &str = "db-it-user";
    /// Default database password.
    pub const POSTGRES_PASSWORD: &str = "db-it-pass";
    /// Clean runs unless switched off.
    pub const FLYWAY_CLEAN: bool = true;
    /// Migrate runs unless switched off.
    pub const FLYWAY_MIGRATE: bool = true;
}

/// Context path the Keycloak server is mounted under.
pub const KEYCLOAK_CONTEXT_PATH: &str = "/auth";

/// Fully resolved description of the environment to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureSpec {
    /// Identity-provider half.
    pub keycloak: KeycloakConfig,
    /// Database half.
    pub postgres: PostgresConfig,
}

impl FixtureSpec {
    /// Resolves every field against `source`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first override that does
    /// not parse for its field.
    pub fn resolve<S: OverrideSource + ?Sized>(source: &S) -> Result<Self> {
        let spec = Self {
            keycloak: KeycloakConfig::resolve(source)?,
            postgres: PostgresConfig::resolve(source)?,
        };
        tracing::debug!(
            "Resolved fixture for realm '{}' and database '{}'",
            spec.keycloak.test_realm_name,
            spec.postgres.database
        );
        Ok(spec)
    }
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            keycloak: KeycloakConfig::default(),
            postgres: PostgresConfig::default(),
        }
    }
}

/// Keycloak coordinates, admin credentials and the fixture to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeycloakConfig {
    /// Transport scheme (`http` or `https`).
    pub scheme: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Administrator username.
    pub admin_username: String,
    /// Administrator password.
    pub admin_password: String,
    /// Realm the administrator authenticates against.
    pub master_realm: String,
    /// Client used for the administrator password grant.
    pub admin_client_id: String,
    /// Client provisioned into the test realm.
    pub test_client_id: String,
    /// Secret of the provisioned client.
    pub test_client_secret: String,
    /// Realm recreated on every run.
    pub test_realm_name: String,
    /// Realm role granted to the provisioned user.
    pub test_user_role: String,
    /// Description of the provisioned role.
    pub test_user_role_description: String,
    /// Username of the provisioned user.
    pub test_admin_username: String,
    /// Permanent password of the provisioned user.
    pub test_admin_password: String,
}

impl KeycloakConfig {
    /// Resolves the Keycloak fields against `source`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `KEYCLOAK_PORT` is not a port number.
    pub fn resolve<S: OverrideSource + ?Sized>(source: &S) -> Result<Self> {
        Ok(Self {
            scheme: string(source, keys::KEYCLOAK_HOST_URI_SCHEMA, defaults::URI_SCHEMA),
            host: string(source, keys::KEYCLOAK_HOST, defaults::KEYCLOAK_HOST),
            port: port(source, keys::KEYCLOAK_PORT, defaults::KEYCLOAK_PORT)?,
            admin_username: string(source, keys::KEYCLOAK_USER, defaults::ADMIN_USERNAME),
            admin_password: string(source, keys::KEYCLOAK_PASSWORD, defaults::ADMIN_PASSWORD),
            master_realm: string(source, keys::KEYCLOAK_MASTER_REALM, defaults::MASTER_REALM),
            admin_client_id: string(
                source,
                keys::KEYCLOAK_ADMIN_CLIENT_ID,
                defaults::ADMIN_CLIENT_ID,
            ),
            test_client_id: string(source, keys::KEYCLOAK_TEST_CLIENT_ID, defaults::TEST_CLIENT_ID),
            test_client_secret: string(
                source,
                keys::KEYCLOAK_TEST_CLIENT_SECRET,
                defaults::TEST_CLIENT_SECRET,
            ),
            test_realm_name: string(
                source,
                keys::KEYCLOAK_TEST_REALM_NAME,
                defaults::TEST_REALM_NAME,
            ),
            test_user_role: string(source, keys::KEYCLOAK_TEST_USER_ROLE, defaults::TEST_USER_ROLE),
            test_user_role_description: string(
                source,
                keys::KEYCLOAK_TEST_USER_ROLE_DESCRIPTION,
                defaults::TEST_USER_ROLE_DESCRIPTION,
            ),
            test_admin_username: string(
                source,
                keys::KEYCLOAK_TEST_ADMIN_USERNAME,
                defaults::TEST_ADMIN_USERNAME,
            ),
            test_admin_password: string(
                source,
                keys::KEYCLOAK_TEST_ADMIN_PASSWORD,
                defaults::TEST_ADMIN_PASSWORD,
            ),
        })
    }

    /// Server address, e.g. `http://localhost:18080`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Base URL of the Keycloak application, e.g. `http://localhost:18080/auth`.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("{}{}", self.address(), KEYCLOAK_CONTEXT_PATH)
    }

    /// OpenID Connect issuer of the provisioned realm.
    #[must_use]
    pub fn issuer_uri(&self) -> String {
        format!("{}/realms/{}", self.server_url(), self.test_realm_name)
    }
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            scheme: defaults::URI_SCHEMA.to_string(),
            host: defaults::KEYCLOAK_HOST.to_string(),
            port: defaults::KEYCLOAK_PORT,
            admin_username: defaults::ADMIN_USERNAME.to_string(),
            admin_password: defaults::ADMIN_PASSWORD.to_string(),
            master_realm: defaults::MASTER_REALM.to_string(),
            admin_client_id: defaults::ADMIN_CLIENT_ID.to_string(),
            test_client_id: defaults::TEST_CLIENT_ID.to_string(),
            test_client_secret: defaults::TEST_CLIENT_SECRET.to_string(),
            test_realm_name: defaults::TEST_REALM_NAME.to_string(),
            test_user_role: defaults::TEST_USER_ROLE.to_string(),
            test_user_role_description: defaults::TEST_USER_ROLE_DESCRIPTION.to_string(),
            test_admin_username: defaults::TEST_ADMIN_USERNAME.to_string(),
            test_admin_password: defaults::TEST_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Database coordinates and reset switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostgresConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Database user.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Drop every schema object before migrating.
    pub clean: bool,
    /// Apply the migration set.
    pub migrate: bool,
    /// Migration directory; `None` means the migration set is empty.
    pub migrations_location: Option<PathBuf>,
}

impl PostgresConfig {
    /// Resolves the database fields against `source`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `POSTGRES_PORT` is not a port
    /// number or a switch is not a boolean.
    pub fn resolve<S: OverrideSource + ?Sized>(source: &S) -> Result<Self> {
        Ok(Self {
            host: string(source, keys::POSTGRES_HOST, defaults::POSTGRES_HOST),
            port: port(source, keys::POSTGRES_PORT, defaults::POSTGRES_PORT)?,
            database: string(source, keys::POSTGRES_DB, defaults::POSTGRES_DB),
            username: string(source, keys::POSTGRES_USER, defaults::POSTGRES_USER),
            password: string(source, keys::POSTGRES_PASSWORD, defaults::POSTGRES_PASSWORD),
            clean: flag(source, keys::FLYWAY_CLEAN, defaults::FLYWAY_CLEAN)?,
            migrate: flag(source, keys::FLYWAY_MIGRATE, defaults::FLYWAY_MIGRATE)?,
            migrations_location: non_empty(source, keys::FLYWAY_LOCATIONS).map(PathBuf::from),
        })
    }

    /// JDBC connection string published to JVM consumers.
    #[must_use]
    pub fn jdbc_url(&self) -> String {
        format!(
            "jdbc:postgresql://{}:{}/{}?loggerLevel=OFF",
            self.host, self.port, self.database
        )
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: defaults::POSTGRES_HOST.to_string(),
            port: defaults::POSTGRES_PORT,
            database: defaults::POSTGRES_DB.to_string(),
            username: defaults::POSTGRES_USER.to_string(),
            password: defaults::POSTGRES_PASSWORD.to_string(),
            clean: defaults::FLYWAY_CLEAN,
            migrate: defaults::FLYWAY_MIGRATE,
            migrations_location: None,
        }
    }
}

fn non_empty<S: OverrideSource + ?Sized>(source: &S, key: &str) -> Option<String> {
    source.lookup(key).filter(|value| !value.is_empty())
}

fn string<S: OverrideSource + ?Sized>(source: &S, key: &str, default: &str) -> String {
    non_empty(source, key).unwrap_or_else(|| default.to_string())
}

fn port<S: OverrideSource + ?Sized>(source: &S, key: &'static str, default: u16) -> Result<u16> {
    let Some(raw) = non_empty(source, key) else {
        return Ok(default);
    };

    match raw.trim().parse::<u16>() {
        Ok(0) => Err(ConfigError::invalid(key, raw, "port must be between 1 and 65535")),
        Ok(port) => Ok(port),
        Err(e) => Err(ConfigError::invalid(key, raw, e.to_string())),
    }
}

fn flag<S: OverrideSource + ?Sized>(source: &S, key: &'static str, default: bool) -> Result<bool> {
    let Some(raw) = non_empty(source, key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected a boolean (true/false)")),
    }
}
