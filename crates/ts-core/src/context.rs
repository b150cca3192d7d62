//! Test-context publishing.
//!
//! Dependent test code never sees the [`FixtureSpec`] itself; it receives a
//! flat [`PropertyOverlay`] whose key names match what Spring Boot style
//! consumers expect, so the same fixture can drive Rust and JVM suites.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{FixtureSpec, KeycloakConfig, PostgresConfig};

/// Published property names.
pub mod property {
    /// OpenID Connect issuer of the provisioned realm.
    pub const ISSUER_URI: &str = "spring.security.oauth2.client.provider.keycloak.issuer-uri";
    /// Provisioned client id.
    pub const CLIENT_ID: &str = "spring.security.oauth2.client.registration.keycloak.client-id";
    /// Provisioned client secret.
    pub const CLIENT_SECRET: &str =
        "spring.security.oauth2.client.registration.keycloak.client-secret";
    /// JDBC URL of the reset database.
    pub const DATASOURCE_URL: &str = "spring.datasource.url";
    /// Database user.
    pub const DATASOURCE_USERNAME: &str = "spring.datasource.username";
    /// Database password.
    pub const DATASOURCE_PASSWORD: &str = "spring.datasource.password";
}

/// Flat key/value properties handed to the test context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyOverlay {
    properties: BTreeMap<String, String>,
}

impl PropertyOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Adds every property of `other`; `other` wins on conflicts.
    pub fn merge(&mut self, other: Self) {
        self.properties.extend(other.properties);
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Iterates properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the overlay is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Renders as a Java `.properties` document.
    #[must_use]
    pub fn to_properties(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}\n", escape_properties(k, true), escape_properties(v, false)))
            .collect()
    }

    /// Renders as `KEY=value` lines using relaxed-binding variable names,
    /// e.g. `SPRING_DATASOURCE_URL`. Values are single-quoted when needed so
    /// the output can be sourced by a POSIX shell.
    #[must_use]
    pub fn to_env(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}\n", env_name(k), shell_quote(v)))
            .collect()
    }

    /// Renders as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a PropertyOverlay {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

/// Derives the published properties from a resolved fixture.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextPublisher;

impl ContextPublisher {
    /// Identity properties: issuer, client id and client secret.
    #[must_use]
    pub fn keycloak(config: &KeycloakConfig) -> PropertyOverlay {
        let mut overlay = PropertyOverlay::new();
        overlay.insert(property::ISSUER_URI, config.issuer_uri());
        overlay.insert(property::CLIENT_ID, &config.test_client_id);
        overlay.insert(property::CLIENT_SECRET, &config.test_client_secret);
        overlay
    }

    /// Datasource properties: URL, username and password.
    #[must_use]
    pub fn postgres(config: &PostgresConfig) -> PropertyOverlay {
        let mut overlay = PropertyOverlay::new();
        overlay.insert(property::DATASOURCE_URL, config.jdbc_url());
        overlay.insert(property::DATASOURCE_USERNAME, &config.username);
        overlay.insert(property::DATASOURCE_PASSWORD, &config.password);
        overlay
    }

    /// Both halves.
    #[must_use]
    pub fn publish(spec: &FixtureSpec) -> PropertyOverlay {
        let mut overlay = Self::keycloak(&spec.keycloak);
        overlay.merge(Self::postgres(&spec.postgres));
        overlay
    }
}

fn escape_properties(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

fn env_name(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-')
        .map(|c| if c == '.' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@%+,=".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}
