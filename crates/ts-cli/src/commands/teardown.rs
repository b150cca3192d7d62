//! Realm teardown command.

use ts_core::FixtureSpec;
use ts_keycloak::{IdentityAdmin, KeycloakAdminSession};

use crate::output::{info, success};

/// Deletes `realm`, or the configured test realm.
pub async fn run_teardown(spec: &FixtureSpec, realm: Option<&str>) -> crate::CliResult<()> {
    let realm = realm.unwrap_or(&spec.keycloak.test_realm_name);
    let session = KeycloakAdminSession::connect(&spec.keycloak).await?;

    if session.delete_realm(realm).await? {
        success(&format!("Realm '{realm}' deleted"));
    } else {
        info(&format!("Realm '{realm}' does not exist"));
    }
    Ok(())
}
