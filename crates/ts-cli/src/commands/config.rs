//! Commands that only look at the resolved fixture.

use ts_core::config::keys;
use ts_core::{ContextPublisher, FixtureSpec};

use crate::config::OutputFormat;
use crate::output::{output, output_overlay, Entry};

const MASK: &str = "********";

/// Resolved fixture as key/value rows, secrets masked.
#[must_use]
pub fn config_entries(spec: &FixtureSpec) -> Vec<Entry> {
    let kc = &spec.keycloak;
    let pg = &spec.postgres;
    let migrations = pg
        .migrations_location
        .as_ref()
        .map_or_else(String::new, |p| p.display().to_string());

    vec![
        Entry::new(keys::KEYCLOAK_HOST_URI_SCHEMA, &kc.scheme),
        Entry::new(keys::KEYCLOAK_HOST, &kc.host),
        Entry::new(keys::KEYCLOAK_PORT, kc.port.to_string()),
        Entry::new(keys::KEYCLOAK_USER, &kc.admin_username),
        Entry::new(keys::KEYCLOAK_PASSWORD, MASK),
        Entry::new(keys::KEYCLOAK_MASTER_REALM, &kc.master_realm),
        Entry::new(keys::KEYCLOAK_ADMIN_CLIENT_ID, &kc.admin_client_id),
        Entry::new(keys::KEYCLOAK_TEST_CLIENT_ID, &kc.test_client_id),
        Entry::new(keys::KEYCLOAK_TEST_CLIENT_SECRET, MASK),
        Entry::new(keys::KEYCLOAK_TEST_REALM_NAME, &kc.test_realm_name),
        Entry::new(keys::KEYCLOAK_TEST_USER_ROLE, &kc.test_user_role),
        Entry::new(
            keys::KEYCLOAK_TEST_USER_ROLE_DESCRIPTION,
            &kc.test_user_role_description,
        ),
        Entry::new(keys::KEYCLOAK_TEST_ADMIN_USERNAME, &kc.test_admin_username),
        Entry::new(keys::KEYCLOAK_TEST_ADMIN_PASSWORD, MASK),
        Entry::new(keys::POSTGRES_HOST, &pg.host),
        Entry::new(keys::POSTGRES_PORT, pg.port.to_string()),
        Entry::new(keys::POSTGRES_DB, &pg.database),
        Entry::new(keys::POSTGRES_USER, &pg.username),
        Entry::new(keys::POSTGRES_PASSWORD, MASK),
        Entry::new(keys::FLYWAY_CLEAN, pg.clean.to_string()),
        Entry::new(keys::FLYWAY_MIGRATE, pg.migrate.to_string()),
        Entry::new(keys::FLYWAY_LOCATIONS, migrations),
    ]
}

/// Runs the show-config command.
pub fn run_show_config(spec: &FixtureSpec, format: OutputFormat) -> crate::CliResult<()> {
    output(&config_entries(spec), format)
}

/// Runs the properties command.
pub fn run_properties(spec: &FixtureSpec, format: OutputFormat) -> crate::CliResult<()> {
    output_overlay(&ContextPublisher::publish(spec), format)
}
