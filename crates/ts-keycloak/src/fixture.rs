//! Declared state to reconcile the server with.

use std::collections::BTreeMap;

use ts_core::KeycloakConfig;

use crate::dto::{
    ClientRepresentation, CredentialRepresentation, RealmRepresentation, RoleRepresentation,
    UserRepresentation, PASSWORD_CREDENTIAL,
};

/// Wildcard accepted for redirect URIs and web origins.
pub const WILDCARD: &str = "*";

/// Protocol of the provisioned client.
pub const OPENID_CONNECT: &str = "openid-connect";

/// Identity attributes of the provisioned user.
pub mod user_defaults {
    /// First name.
    pub const FIRST_NAME: &str = "JUnit";
    /// Last name.
    pub const LAST_NAME: &str = "Tester";
    /// Email address.
    pub const EMAIL: &str = "junit+tester1@gec.io";
    /// Attribute tagging where the user came from.
    pub const ORIGIN_ATTRIBUTE: &str = "origin";
    /// Value of the origin attribute.
    pub const ORIGIN_VALUE: &str = "demo";
}

/// Realm to recreate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmFixture {
    /// Realm name.
    pub name: String,
    /// Whether the realm is enabled.
    pub enabled: bool,
}

impl RealmFixture {
    /// Wire representation for the create call.
    #[must_use]
    pub fn to_representation(&self) -> RealmRepresentation {
        RealmRepresentation {
            id: None,
            realm: self.name.clone(),
            enabled: Some(self.enabled),
        }
    }
}

/// Client to create inside the fresh realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFixture {
    /// Client id, used as both internal id and OAuth2 client id.
    pub client_id: String,
    /// Client secret.
    pub secret: String,
    /// Allowed redirect URIs.
    pub redirect_uris: Vec<String>,
    /// Allowed CORS origins.
    pub web_origins: Vec<String>,
    /// Protocol identifier.
    pub protocol: String,
}

impl ClientFixture {
    /// Wire representation for the create call.
    #[must_use]
    pub fn to_representation(&self) -> ClientRepresentation {
        ClientRepresentation {
            id: Some(self.client_id.clone()),
            client_id: Some(self.client_id.clone()),
            secret: Some(self.secret.clone()),
            redirect_uris: self.redirect_uris.clone(),
            web_origins: self.web_origins.clone(),
            protocol: Some(self.protocol.clone()),
        }
    }
}

/// User to recreate, with a permanent password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFixture {
    /// Username.
    pub username: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Custom attributes.
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Password, set as non-temporary.
    pub password: String,
}

impl UserFixture {
    /// Wire representation for the create call.
    #[must_use]
    pub fn to_representation(&self) -> UserRepresentation {
        UserRepresentation {
            id: None,
            username: self.username.clone(),
            enabled: Some(true),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            email: Some(self.email.clone()),
            attributes: self.attributes.clone(),
        }
    }

    /// Password credential; never temporary, so no reset is forced on login.
    #[must_use]
    pub fn credential(&self) -> CredentialRepresentation {
        CredentialRepresentation {
            credential_type: PASSWORD_CREDENTIAL.to_string(),
            value: self.password.clone(),
            temporary: false,
        }
    }

    /// Whether `username` names this user. Keycloak stores usernames lowercased.
    #[must_use]
    pub fn matches(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}

/// Realm role to recreate and assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleFixture {
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
}

impl RoleFixture {
    /// Wire representation for the create call.
    #[must_use]
    pub fn to_representation(&self) -> RoleRepresentation {
        RoleRepresentation {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            composite: false,
            ..RoleRepresentation::default()
        }
    }
}

/// Everything one provisioning run reconciles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    /// Realm.
    pub realm: RealmFixture,
    /// Client.
    pub client: ClientFixture,
    /// User.
    pub user: UserFixture,
    /// Role.
    pub role: RoleFixture,
}

impl FixtureSet {
    /// Builds the fixtures described by `config`.
    #[must_use]
    pub fn from_config(config: &KeycloakConfig) -> Self {
        let attributes = BTreeMap::from([(
            user_defaults::ORIGIN_ATTRIBUTE.to_string(),
            vec![user_defaults::ORIGIN_VALUE.to_string()],
        )]);

        Self {
            realm: RealmFixture {
                name: config.test_realm_name.clone(),
                enabled: true,
            },
            client: ClientFixture {
                client_id: config.test_client_id.clone(),
                secret: config.test_client_secret.clone(),
                redirect_uris: vec![WILDCARD.to_string()],
                web_origins: vec![WILDCARD.to_string()],
                protocol: OPENID_CONNECT.to_string(),
            },
            user: UserFixture {
                username: config.test_admin_username.clone(),
                first_name: user_defaults::FIRST_NAME.to_string(),
                last_name: user_defaults::LAST_NAME.to_string(),
                email: user_defaults::EMAIL.to_string(),
                attributes,
                password: config.test_admin_password.clone(),
            },
            role: RoleFixture {
                name: config.test_user_role.clone(),
                description: config.test_user_role_description.clone(),
            },
        }
    }
}
