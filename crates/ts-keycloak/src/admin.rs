//! Identity-provider administration seam.

use async_trait::async_trait;

use crate::client::CreatedResource;
use crate::dto::RoleRepresentation;
use crate::error::KeycloakResult;
use crate::fixture::{ClientFixture, RealmFixture, RoleFixture, UserFixture};

/// A realm that [`IdentityAdmin::ensure_realm`] has just recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmHandle {
    name: String,
}

impl RealmHandle {
    /// Wraps a realm name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Realm name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Admin API path of the realm, with the name percent-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/admin/realms/{}", urlencoding::encode(&self.name))
    }
}

/// A user created by [`IdentityAdmin::ensure_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHandle {
    /// Server-assigned id.
    pub id: String,
    /// Username.
    pub username: String,
}

/// Ensure operations over realms, clients, users and roles.
///
/// Each operation is delete-then-create. Callers must invoke them in the
/// order realm, client, user, role, and must stop at the first error.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    /// Deletes the realm if it exists, then creates it fresh.
    async fn ensure_realm(&self, realm: &RealmFixture) -> KeycloakResult<RealmHandle>;

    /// Creates the client. Assumes the realm was just recreated; calling it
    /// twice against the same realm is a caller error.
    async fn ensure_client(
        &self,
        realm: &RealmHandle,
        client: &ClientFixture,
    ) -> KeycloakResult<CreatedResource>;

    /// Deletes any user with the fixture's username, creates it, and sets
    /// its permanent password.
    async fn ensure_user(&self, realm: &RealmHandle, user: &UserFixture)
        -> KeycloakResult<UserHandle>;

    /// Deletes the realm role if it exists, creates it, and assigns it at
    /// realm level to every user in `assignees`.
    async fn ensure_role(
        &self,
        realm: &RealmHandle,
        role: &RoleFixture,
        assignees: &[UserHandle],
    ) -> KeycloakResult<RoleRepresentation>;

    /// Deletes the realm if it exists; returns whether it did.
    async fn delete_realm(&self, name: &str) -> KeycloakResult<bool>;
}
