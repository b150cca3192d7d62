//! Keycloak-backed [`IdentityAdmin`].

use async_trait::async_trait;
use ts_core::KeycloakConfig;

use crate::admin::{IdentityAdmin, RealmHandle, UserHandle};
use crate::client::{AdminClient, CreatedResource};
use crate::dto::{RealmRepresentation, RoleRepresentation, UserRepresentation};
use crate::error::KeycloakResult;
use crate::fixture::{ClientFixture, RealmFixture, RoleFixture, UserFixture};

/// One authenticated administrative session.
#[derive(Debug, Clone)]
pub struct KeycloakAdminSession {
    client: AdminClient,
}

impl KeycloakAdminSession {
    /// Authenticates and opens the session.
    ///
    /// # Errors
    ///
    /// Fails if the server is unreachable or rejects the admin credentials.
    pub async fn connect(config: &KeycloakConfig) -> KeycloakResult<Self> {
        Ok(Self::from_client(AdminClient::connect(config).await?))
    }

    /// Wraps an already authenticated client.
    #[must_use]
    pub fn from_client(client: AdminClient) -> Self {
        Self { client }
    }

    /// Lists every realm the administrator can see.
    pub async fn list_realms(&self) -> KeycloakResult<Vec<RealmRepresentation>> {
        self.client.get("/admin/realms").await
    }
}

#[async_trait]
impl IdentityAdmin for KeycloakAdminSession {
    async fn ensure_realm(&self, realm: &RealmFixture) -> KeycloakResult<RealmHandle> {
        self.delete_realm(&realm.name).await?;

        self.client
            .post("/admin/realms", &realm.to_representation())
            .await?;
        tracing::info!("Created realm '{}'", realm.name);

        Ok(RealmHandle::new(&realm.name))
    }

    async fn ensure_client(
        &self,
        realm: &RealmHandle,
        client: &ClientFixture,
    ) -> KeycloakResult<CreatedResource> {
        let created = self
            .client
            .post(
                &format!("{}/clients", realm.path()),
                &client.to_representation(),
            )
            .await?;
        tracing::info!(
            "Created client '{}' in realm '{}'",
            client.client_id,
            realm.name()
        );

        Ok(created)
    }

    async fn ensure_user(
        &self,
        realm: &RealmHandle,
        user: &UserFixture,
    ) -> KeycloakResult<UserHandle> {
        let users_path = format!("{}/users", realm.path());

        let existing: Vec<UserRepresentation> = self
            .client
            .get(&format!(
                "{}?username={}&exact=true",
                users_path,
                urlencoding::encode(&user.username)
            ))
            .await?;
        tracing::debug!(
            "Found {} user(s) matching '{}' in realm '{}'",
            existing.len(),
            user.username,
            realm.name()
        );

        for stale in existing.iter().filter(|u| user.matches(&u.username)) {
            if let Some(id) = &stale.id {
                tracing::warn!("Deleting existing user '{}' ({})", stale.username, id);
                self.client
                    .delete(&format!("{}/{}", users_path, urlencoding::encode(id)))
                    .await?;
            }
        }

        let id = self
            .client
            .post(&users_path, &user.to_representation())
            .await?
            .require_id("user")?;

        self.client
            .put(
                &format!("{}/{}/reset-password", users_path, urlencoding::encode(&id)),
                &user.credential(),
            )
            .await?;
        tracing::info!(
            "Created user '{}' ({}) with a permanent password in realm '{}'",
            user.username,
            id,
            realm.name()
        );

        Ok(UserHandle {
            id,
            username: user.username.clone(),
        })
    }

    async fn ensure_role(
        &self,
        realm: &RealmHandle,
        role: &RoleFixture,
        assignees: &[UserHandle],
    ) -> KeycloakResult<RoleRepresentation> {
        let roles_path = format!("{}/roles", realm.path());
        let role_path = format!("{}/{}", roles_path, urlencoding::encode(&role.name));

        let existing: Vec<RoleRepresentation> = self.client.get(&roles_path).await?;
        if existing.iter().any(|r| r.name == role.name) {
            tracing::warn!("Deleting existing role '{}' in realm '{}'", role.name, realm.name());
            self.client.delete(&role_path).await?;
        }

        self.client
            .post(&roles_path, &role.to_representation())
            .await?;
        let created: RoleRepresentation = self.client.get(&role_path).await?;
        tracing::info!("Created role '{}' in realm '{}'", created.name, realm.name());

        for user in assignees {
            self.client
                .post(
                    &format!(
                        "{}/users/{}/role-mappings/realm",
                        realm.path(),
                        urlencoding::encode(&user.id)
                    ),
                    std::slice::from_ref(&created),
                )
                .await?;
            tracing::info!("Assigned role '{}' to user '{}'", created.name, user.username);
        }

        Ok(created)
    }

    async fn delete_realm(&self, name: &str) -> KeycloakResult<bool> {
        let realms = self.list_realms().await?;

        if !realms.iter().any(|r| r.realm == name) {
            tracing::debug!("Realm '{}' does not exist", name);
            return Ok(false);
        }

        tracing::warn!("Deleting existing realm '{}' and everything in it", name);
        self.client.delete(&RealmHandle::new(name).path()).await?;
        Ok(true)
    }
}
