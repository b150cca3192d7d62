//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use ts_core::{config::keys, FixtureSpec, MapSource, PostgresConfig};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";
const ACCESS_TOKEN: &str = "fake-admin-token";

/// Installs a test subscriber once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ts_keycloak=debug,ts_postgres=debug,sqlx=warn")
        .with_test_writer()
        .try_init();
}

/// A user held by the fake server.
#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub representation: Value,
    pub password: Option<String>,
    pub temporary: Option<bool>,
    pub realm_roles: Vec<String>,
}

impl FakeUser {
    pub fn username(&self) -> &str {
        self.representation["username"].as_str().unwrap_or_default()
    }
}

/// A realm held by the fake server.
#[derive(Debug, Clone, Default)]
pub struct FakeRealm {
    pub id: String,
    pub representation: Value,
    pub clients: Vec<Value>,
    pub users: Vec<FakeUser>,
    pub roles: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub realms: BTreeMap<String, FakeRealm>,
    pub tokens_issued: usize,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Stateful stand-in for the Keycloak admin REST API.
///
/// Implements just enough of realm, client, user and role management for the
/// provisioning pipeline, including 409 on duplicate creates and cascading
/// role deletion, so repeated runs behave like they do against a real server.
#[derive(Clone, Default)]
pub struct FakeKeycloak {
    state: Arc<Mutex<FakeState>>,
}

impl FakeKeycloak {
    /// Starts a mock server backed by a fresh fake.
    pub async fn start() -> (MockServer, Self) {
        init_tracing();
        let server = MockServer::start().await;
        let fake = Self::default();

        Mock::given(path_regex("^/auth/"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;

        (server, fake)
    }

    /// Locks the server state for inspection.
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Clone of a realm, if present.
    pub fn realm(&self, name: &str) -> Option<FakeRealm> {
        self.state().realms.get(name).cloned()
    }

    /// Seeds a realm with leftovers from an earlier run.
    pub fn seed_realm(&self, name: &str, usernames: &[&str]) {
        let mut state = self.state();
        let id = state.next_id("realm");
        let users: Vec<FakeUser> = usernames
            .iter()
            .map(|username| FakeUser {
                id: state.next_id("user"),
                representation: json!({ "username": username, "enabled": true }),
                password: None,
                temporary: None,
                realm_roles: Vec::new(),
            })
            .collect();
        state.realms.insert(
            name.to_string(),
            FakeRealm {
                id: id.clone(),
                representation: json!({ "id": id, "realm": name, "enabled": true }),
                users,
                ..FakeRealm::default()
            },
        );
    }

    fn handle(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().trim_start_matches("/auth").to_string();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let method = request.method.as_str();

        if let ["realms", _, "protocol", "openid-connect", "token"] = segments.as_slice() {
            return self.token(request);
        }

        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}"));
        if !authorized {
            return ResponseTemplate::new(401);
        }

        let mut state = self.state();
        let base = request.url.as_str().split("/auth/").next().unwrap_or_default().to_string();

        match (method, segments.as_slice()) {
            ("GET", ["admin", "realms"]) => {
                let realms: Vec<Value> =
                    state.realms.values().map(|r| r.representation.clone()).collect();
                ResponseTemplate::new(200).set_body_json(realms)
            }
            ("POST", ["admin", "realms"]) => {
                let body = body_json(request);
                let name = body["realm"].as_str().unwrap_or_default().to_string();
                if state.realms.contains_key(&name) {
                    return conflict("Conflict detected. See logs for details");
                }
                let id = state.next_id("realm");
                let mut representation = body;
                representation["id"] = json!(id);
                state.realms.insert(
                    name.clone(),
                    FakeRealm {
                        id,
                        representation,
                        ..FakeRealm::default()
                    },
                );
                created(&format!("{base}/auth/admin/realms/{name}"))
            }
            ("DELETE", ["admin", "realms", realm]) => match state.realms.remove(*realm) {
                Some(_) => ResponseTemplate::new(204),
                None => not_found("Realm not found."),
            },
            (_, ["admin", "realms", realm, rest @ ..]) => {
                let realm = (*realm).to_string();
                let rest: Vec<String> = rest.iter().map(|s| (*s).to_string()).collect();
                let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();
                let FakeState {
                    realms, next_id, ..
                } = &mut *state;
                let Some(r) = realms.get_mut(&realm) else {
                    return not_found("Realm not found.");
                };
                let mut ids = IdAllocator(next_id);
                let location = format!("{base}/auth/admin/realms/{realm}");
                realm_route(r, method, &rest, &query, body_json(request), &location, &mut ids)
            }
            _ => not_found("HTTP 404 Not Found"),
        }
    }

    fn token(&self, request: &Request) -> ResponseTemplate {
        let form: BTreeMap<String, String> = url_form(&request.body);
        let valid = form.get("grant_type").map(String::as_str) == Some("password")
            && form.get("client_id").map(String::as_str) == Some("admin-cli")
            && form.get("username").map(String::as_str) == Some(ADMIN_USERNAME)
            && form.get("password").map(String::as_str) == Some(ADMIN_PASSWORD);

        if !valid {
            return ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials"
            }));
        }

        self.state().tokens_issued += 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 60,
            "token_type": "Bearer"
        }))
    }
}

impl Respond for FakeKeycloak {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.handle(request)
    }
}

struct IdAllocator<'a>(&'a mut u64);

impl IdAllocator<'_> {
    fn next(&mut self, prefix: &str) -> String {
        *self.0 += 1;
        format!("{prefix}-{}", self.0)
    }
}

fn realm_route(
    realm: &mut FakeRealm,
    method: &str,
    rest: &[String],
    query: &BTreeMap<String, String>,
    body: Value,
    location: &str,
    ids: &mut IdAllocator<'_>,
) -> ResponseTemplate {
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    match (method, rest.as_slice()) {
        ("GET", ["clients"]) => ResponseTemplate::new(200).set_body_json(&realm.clients),
        ("POST", ["clients"]) => {
            let client_id = body["clientId"].as_str().unwrap_or_default();
            if realm.clients.iter().any(|c| c["clientId"] == client_id) {
                return conflict(&format!("Client {client_id} already exists"));
            }
            let id = body["id"]
                .as_str()
                .map_or_else(|| ids.next("client"), str::to_string);
            let mut representation = body;
            representation["id"] = json!(id);
            realm.clients.push(representation);
            created(&format!("{location}/clients/{id}"))
        }

        ("GET", ["users"]) => {
            let wanted = query.get("username").map(|u| u.to_lowercase());
            let exact = query.get("exact").is_some_and(|v| v == "true");
            let users: Vec<Value> = realm
                .users
                .iter()
                .filter(|u| match &wanted {
                    Some(w) if exact => u.username() == w.as_str(),
                    Some(w) => u.username().contains(w.as_str()),
                    None => true,
                })
                .map(user_json)
                .collect();
            ResponseTemplate::new(200).set_body_json(users)
        }
        ("POST", ["users"]) => {
            let username = body["username"].as_str().unwrap_or_default().to_lowercase();
            if realm.users.iter().any(|u| u.username() == username) {
                return conflict("User exists with same username");
            }
            let id = ids.next("user");
            let mut representation = body;
            representation["username"] = json!(username);
            realm.users.push(FakeUser {
                id: id.clone(),
                representation,
                password: None,
                temporary: None,
                realm_roles: Vec::new(),
            });
            created(&format!("{location}/users/{id}"))
        }
        ("DELETE", ["users", id]) => {
            let before = realm.users.len();
            realm.users.retain(|u| u.id != *id);
            if realm.users.len() == before {
                not_found("User not found")
            } else {
                ResponseTemplate::new(204)
            }
        }
        ("PUT", ["users", id, "reset-password"]) => {
            let Some(user) = realm.users.iter_mut().find(|u| u.id == *id) else {
                return not_found("User not found");
            };
            user.password = body["value"].as_str().map(str::to_string);
            user.temporary = body["temporary"].as_bool();
            ResponseTemplate::new(204)
        }
        ("GET", ["users", id, "role-mappings", "realm"]) => {
            let Some(user) = realm.users.iter().find(|u| u.id == *id) else {
                return not_found("User not found");
            };
            let roles: Vec<Value> = realm
                .roles
                .iter()
                .filter(|r| user.realm_roles.iter().any(|n| r["name"] == n.as_str()))
                .cloned()
                .collect();
            ResponseTemplate::new(200).set_body_json(roles)
        }
        ("POST", ["users", id, "role-mappings", "realm"]) => {
            let names: Vec<String> = body
                .as_array()
                .map(|roles| {
                    roles
                        .iter()
                        .filter_map(|r| r["name"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            if let Some(missing) = names
                .iter()
                .find(|n| !realm.roles.iter().any(|r| r["name"] == n.as_str()))
            {
                return not_found(&format!("Role {missing} not found"));
            }
            let Some(user) = realm.users.iter_mut().find(|u| u.id == *id) else {
                return not_found("User not found");
            };
            for name in names {
                if !user.realm_roles.contains(&name) {
                    user.realm_roles.push(name);
                }
            }
            ResponseTemplate::new(204)
        }

        ("GET", ["roles"]) => ResponseTemplate::new(200).set_body_json(&realm.roles),
        ("POST", ["roles"]) => {
            let name = body["name"].as_str().unwrap_or_default().to_string();
            if realm.roles.iter().any(|r| r["name"] == name.as_str()) {
                return conflict(&format!("Role with name {name} already exists"));
            }
            let id = ids.next("role");
            let mut representation = body;
            representation["id"] = json!(id);
            representation["containerId"] = json!(realm.id);
            representation["clientRole"] = json!(false);
            realm.roles.push(representation);
            created(&format!("{location}/roles/{name}"))
        }
        ("GET", ["roles", name]) => match realm.roles.iter().find(|r| r["name"] == *name) {
            Some(role) => ResponseTemplate::new(200).set_body_json(role),
            None => not_found("Could not find role"),
        },
        ("DELETE", ["roles", name]) => {
            let before = realm.roles.len();
            realm.roles.retain(|r| r["name"] != *name);
            if realm.roles.len() == before {
                return not_found("Could not find role");
            }
            for user in &mut realm.users {
                user.realm_roles.retain(|n| n.as_str() != *name);
            }
            ResponseTemplate::new(204)
        }

        _ => not_found("HTTP 404 Not Found"),
    }
}

fn user_json(user: &FakeUser) -> Value {
    let mut representation = user.representation.clone();
    representation["id"] = json!(user.id);
    representation
}

fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

fn url_form(body: &[u8]) -> BTreeMap<String, String> {
    String::from_utf8_lossy(body)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(k, v)| {
            let k = urlencoding::decode(&k.replace('+', " ")).ok()?.into_owned();
            let v = urlencoding::decode(&v.replace('+', " ")).ok()?.into_owned();
            Some((k, v))
        })
        .collect()
}

fn created(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).insert_header("Location", location)
}

fn conflict(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(409).set_body_json(json!({ "errorMessage": message }))
}

fn not_found(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "error": message }))
}

/// Fixture pointing at `server`, with extra overrides applied.
pub fn fixture_for(server: &MockServer, overrides: &[(&str, &str)]) -> anyhow::Result<FixtureSpec> {
    let address = server.address();
    let source = overrides.iter().fold(
        MapSource::new()
            .with(keys::KEYCLOAK_HOST, address.ip().to_string())
            .with(keys::KEYCLOAK_PORT, address.port().to_string()),
        |source, (key, value)| source.with(*key, *value),
    );
    Ok(FixtureSpec::resolve(&source)?)
}

/// Disposable Postgres for reset tests.
pub struct TestDatabase {
    _postgres: ContainerAsync<Postgres>,
    /// Coordinates of the container.
    pub config: PostgresConfig,
    /// Pool used to inspect the schema.
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a container; requires Docker.
    pub async fn start() -> anyhow::Result<Self> {
        init_tracing();

        let postgres = Postgres::default().with_tag("16-alpine").start().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;

        let config = PostgresConfig {
            host: "127.0.0.1".to_string(),
            port,
            database: "postgres".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            ..PostgresConfig::default()
        };
        let pool = PgPool::connect_with(ts_postgres::connect_options(&config)).await?;

        Ok(Self {
            _postgres: postgres,
            config,
            pool,
        })
    }

    /// Tables in the current schema, sorted.
    pub async fn tables(&self) -> anyhow::Result<Vec<String>> {
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT tablename::text FROM pg_tables WHERE schemaname = current_schema() ORDER BY tablename",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables.into_iter().map(|(name,)| name).collect())
    }

    /// Routines (functions, procedures, aggregates) named `name` in the current schema.
    pub async fn count_routines(&self, name: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM pg_proc p JOIN pg_namespace n ON n.oid = p.pronamespace \
             WHERE n.nspname = current_schema() AND p.proname = $1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Runs arbitrary setup SQL.
    pub async fn execute(&self, sql: &str) -> anyhow::Result<()> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }
}

/// Writes migration scripts into a temporary directory.
pub fn migrations(scripts: &[(&str, &str)]) -> anyhow::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    for (name, sql) in scripts {
        std::fs::write(dir.path().join(name), sql)?;
    }
    Ok(dir)
}
