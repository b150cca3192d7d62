//! Keycloak provisioning tests.

use ts_core::context::property;
use ts_core::{config::keys, ContextPublisher};
use ts_keycloak::{
    FixtureSet, IdentityAdmin, KeycloakAdminSession, ProvisionStep, ProvisioningPipeline,
    RealmHandle,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{fixture_for, FakeKeycloak};

/// Tests that a custom realm name gets the full fixture.
#[tokio::test]
async fn test_playground_realm_is_provisioned() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[(keys::KEYCLOAK_TEST_REALM_NAME, "playground")])?;

    let report = ProvisioningPipeline::new(spec.keycloak.clone()).run().await?;
    assert_eq!(report.realm, "playground");

    let realm = fake.realm("playground").expect("realm should exist");
    assert_eq!(realm.representation["enabled"], true);

    assert_eq!(realm.clients.len(), 1);
    let client = &realm.clients[0];
    assert_eq!(client["clientId"], "sb-client");
    assert_eq!(client["secret"], "ad0be000-0000-4000-a000-000000000000");
    assert_eq!(client["redirectUris"], serde_json::json!(["*"]));
    assert_eq!(client["webOrigins"], serde_json::json!(["*"]));
    assert_eq!(client["protocol"], "openid-connect");

    assert_eq!(realm.users.len(), 1);
    let user = &realm.users[0];
    assert_eq!(user.username(), "sb-admin");
    assert_eq!(user.representation["firstName"], "JUnit");
    assert_eq!(user.representation["email"], "junit+tester1@gec.io");
    assert_eq!(user.representation["attributes"]["origin"], serde_json::json!(["demo"]));
    assert_eq!(user.password.as_deref(), Some("ThisIsHow2ConnectAnAdmin!"));
    assert_eq!(user.temporary, Some(false));
    assert_eq!(user.realm_roles, vec!["sb-manager".to_string()]);

    assert_eq!(realm.roles.len(), 1);
    assert_eq!(realm.roles[0]["description"], "sandbox manager");
    assert_eq!(realm.roles[0]["composite"], false);

    Ok(())
}

/// Tests that two full runs leave exactly one client, user and role.
#[tokio::test]
async fn test_repeated_runs_are_idempotent() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[])?;
    let pipeline = ProvisioningPipeline::new(spec.keycloak);

    let first = pipeline.run().await?;
    let second = pipeline.run().await?;

    let realm = fake.realm("sandbox").expect("realm should exist");
    assert_eq!(realm.clients.len(), 1);
    assert_eq!(realm.users.len(), 1);
    assert_eq!(realm.roles.len(), 1);
    assert_eq!(realm.users[0].realm_roles, vec!["sb-manager".to_string()]);
    assert_ne!(first.user.id, second.user.id);
    assert_eq!(fake.state().tokens_issued, 2);

    Ok(())
}

/// Tests that ensure_user replaces a user left over from an earlier run.
#[tokio::test]
async fn test_existing_user_is_replaced() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    fake.seed_realm("sandbox", &["sb-admin", "someone-else"]);
    let stale_id = fake.realm("sandbox").expect("seeded").users[0].id.clone();

    let spec = fixture_for(&server, &[])?;
    let fixtures = FixtureSet::from_config(&spec.keycloak);
    let session = KeycloakAdminSession::connect(&spec.keycloak).await?;

    let user = session
        .ensure_user(&RealmHandle::new("sandbox"), &fixtures.user)
        .await?;

    let realm = fake.realm("sandbox").expect("realm should exist");
    let matching: Vec<_> = realm
        .users
        .iter()
        .filter(|u| u.username() == "sb-admin")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, user.id);
    assert_ne!(user.id, stale_id);
    assert!(realm.users.iter().any(|u| u.username() == "someone-else"));

    Ok(())
}

/// Tests that the user's realm roles are exactly the fixture role after a rerun.
#[tokio::test]
async fn test_role_assignment_is_exact() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[])?;
    let fixtures = FixtureSet::from_config(&spec.keycloak);
    let session = KeycloakAdminSession::connect(&spec.keycloak).await?;

    let realm = session.ensure_realm(&fixtures.realm).await?;
    let user = session.ensure_user(&realm, &fixtures.user).await?;
    session
        .ensure_role(&realm, &fixtures.role, std::slice::from_ref(&user))
        .await?;
    session
        .ensure_role(&realm, &fixtures.role, std::slice::from_ref(&user))
        .await?;

    let state = fake.realm("sandbox").expect("realm should exist");
    assert_eq!(state.roles.len(), 1);
    assert_eq!(state.users[0].realm_roles, vec!["sb-manager".to_string()]);

    Ok(())
}

/// Tests that rejected admin credentials fail at connect and touch nothing.
#[tokio::test]
async fn test_bad_admin_password_fails_at_connect() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[(keys::KEYCLOAK_PASSWORD, "not-the-password")])?;

    let err = ProvisioningPipeline::new(spec.keycloak)
        .run()
        .await
        .expect_err("connect should fail");

    assert_eq!(err.step, ProvisionStep::Connect);
    assert!(err.is_connection_error());
    assert!(fake.state().realms.is_empty());

    Ok(())
}

/// Tests that a failing client create stops before the user and role.
#[tokio::test]
async fn test_failed_step_aborts_the_rest() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/admin/realms/sandbox/clients"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(1)
        .mount(&server)
        .await;
    let spec = fixture_for(&server, &[])?;

    let err = ProvisioningPipeline::new(spec.keycloak)
        .run()
        .await
        .expect_err("client step should fail");

    assert_eq!(err.step, ProvisionStep::Client);
    assert!(err.is_reconciliation_error());

    let realm = fake.realm("sandbox").expect("realm was created before the failure");
    assert!(realm.users.is_empty());
    assert!(realm.roles.is_empty());

    Ok(())
}

/// Tests that teardown deletes the realm once and then reports it missing.
#[tokio::test]
async fn test_teardown_deletes_realm() -> anyhow::Result<()> {
    let (server, fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[])?;
    ProvisioningPipeline::new(spec.keycloak.clone()).run().await?;

    let session = KeycloakAdminSession::connect(&spec.keycloak).await?;
    assert!(session.delete_realm("sandbox").await?);
    assert!(!session.delete_realm("sandbox").await?);
    assert!(fake.realm("sandbox").is_none());

    Ok(())
}

/// Tests that published properties point at the provisioned realm.
#[tokio::test]
async fn test_published_issuer_matches_server() -> anyhow::Result<()> {
    let (server, _fake) = FakeKeycloak::start().await;
    let spec = fixture_for(&server, &[(keys::KEYCLOAK_TEST_REALM_NAME, "playground")])?;
    ProvisioningPipeline::new(spec.keycloak.clone()).run().await?;

    let overlay = ContextPublisher::publish(&spec);
    assert_eq!(
        overlay.get(property::ISSUER_URI),
        Some(format!("{}/auth/realms/playground", server.uri()).as_str())
    );
    assert_eq!(overlay.get(property::CLIENT_ID), Some("sb-client"));

    Ok(())
}
