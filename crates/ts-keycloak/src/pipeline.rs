//! Ordered, fail-fast provisioning.

use ts_core::KeycloakConfig;

use crate::admin::{IdentityAdmin, UserHandle};
use crate::client::CreatedResource;
use crate::dto::RoleRepresentation;
use crate::error::{ProvisionError, ProvisionStep};
use crate::fixture::FixtureSet;
use crate::session::KeycloakAdminSession;

/// What a successful run created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Realm name.
    pub realm: String,
    /// Client creation result.
    pub client: CreatedResource,
    /// Created user.
    pub user: UserHandle,
    /// Created and assigned role.
    pub role: RoleRepresentation,
}

/// Connects to Keycloak and provisions the fixtures derived from a config.
#[derive(Debug, Clone)]
pub struct ProvisioningPipeline {
    config: KeycloakConfig,
    fixtures: FixtureSet,
}

impl ProvisioningPipeline {
    /// Creates a pipeline for `config`.
    #[must_use]
    pub fn new(config: KeycloakConfig) -> Self {
        let fixtures = FixtureSet::from_config(&config);
        Self { config, fixtures }
    }

    /// Fixtures this pipeline reconciles.
    #[must_use]
    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    /// Runs connect, realm, client, user and role in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing step; nothing after it runs.
    pub async fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        let session = self.connect().await?;
        provision(&session, &self.fixtures).await
    }

    /// Opens the administrative session only.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionStep::Connect`] error.
    pub async fn connect(&self) -> Result<KeycloakAdminSession, ProvisionError> {
        KeycloakAdminSession::connect(&self.config)
            .await
            .map_err(ProvisionError::at(ProvisionStep::Connect))
    }
}

/// Reconciles `admin` with `fixtures`: realm, client, user, role.
///
/// # Errors
///
/// Returns the first failing step tagged with its [`ProvisionStep`].
pub async fn provision<A: IdentityAdmin + ?Sized>(
    admin: &A,
    fixtures: &FixtureSet,
) -> Result<ProvisionReport, ProvisionError> {
    let realm = admin
        .ensure_realm(&fixtures.realm)
        .await
        .map_err(ProvisionError::at(ProvisionStep::Realm))?;

    let client = admin
        .ensure_client(&realm, &fixtures.client)
        .await
        .map_err(ProvisionError::at(ProvisionStep::Client))?;

    let user = admin
        .ensure_user(&realm, &fixtures.user)
        .await
        .map_err(ProvisionError::at(ProvisionStep::User))?;

    let role = admin
        .ensure_role(&realm, &fixtures.role, std::slice::from_ref(&user))
        .await
        .map_err(ProvisionError::at(ProvisionStep::Role))?;

    tracing::info!(
        "Provisioned realm '{}' with client '{}', user '{}' and role '{}'",
        realm.name(),
        fixtures.client.client_id,
        user.username,
        role.name
    );

    Ok(ProvisionReport {
        realm: realm.name().to_string(),
        client,
        user,
        role,
    })
}
