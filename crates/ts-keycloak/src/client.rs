//! Authenticated transport for the Keycloak admin REST API.

use reqwest::header::LOCATION;
use serde::{de::DeserializeOwned, Serialize};
use ts_core::KeycloakConfig;

use crate::dto::TokenResponse;
use crate::error::{KeycloakError, KeycloakResult};

/// Result of a create call: the new resource's location and identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedResource {
    /// Value of the `Location` header, if the server sent one.
    pub location: Option<String>,
    /// Last path segment of the location.
    pub id: Option<String>,
}

impl CreatedResource {
    /// Builds the result from a `Location` header value.
    #[must_use]
    pub fn from_location(location: Option<String>) -> Self {
        let id = location.as_deref().and_then(|loc| {
            loc.trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        });
        Self { location, id }
    }

    /// Returns the identifier, or an error naming `resource` if there is none.
    ///
    /// # Errors
    ///
    /// Returns `KeycloakError::MissingLocation` when the server did not
    /// report where the resource was created.
    pub fn require_id(self, resource: &'static str) -> KeycloakResult<String> {
        self.id.ok_or(KeycloakError::MissingLocation { resource })
    }
}

/// Admin API client holding one bearer token.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    server_url: String,
    access_token: String,
}

impl AdminClient {
    /// Authenticates with the administrator password grant.
    ///
    /// The grant is issued against the master realm's token endpoint with
    /// the admin client id. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns `KeycloakError::Connection` if the server is unreachable and
    /// `KeycloakError::Authentication` if the grant is rejected.
    pub async fn connect(config: &KeycloakConfig) -> KeycloakResult<Self> {
        let server_url = config.server_url();
        let http = reqwest::Client::builder().build()?;

        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            server_url,
            urlencoding::encode(&config.master_realm)
        );

        tracing::debug!("Requesting admin token from {}", token_url);

        let response = http
            .post(&token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", config.admin_client_id.as_str()),
                ("username", config.admin_username.as_str()),
                ("password", config.admin_password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| KeycloakError::Connection(format!("{token_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(KeycloakError::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::info!(
            "Authenticated as '{}' against realm '{}' at {}",
            config.admin_username,
            config.master_realm,
            server_url
        );

        Ok(Self {
            http,
            server_url,
            access_token: token.access_token,
        })
    }

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> KeycloakResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = check("GET", path, response).await?;
        Ok(response.json().await?)
    }

    /// Makes a POST request and reports where the server created the resource.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> KeycloakResult<CreatedResource> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        let response = check("POST", path, response).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(CreatedResource::from_location(location))
    }

    /// Makes a PUT request.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> KeycloakResult<()> {
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        check("PUT", path, response).await?;
        Ok(())
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> KeycloakResult<()> {
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        check("DELETE", path, response).await?;
        Ok(())
    }

    /// Gets the server URL, including the context path.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }
}

/// Turns a non-success response into `KeycloakError::Api`.
async fn check(
    method: &'static str,
    path: &str,
    response: reqwest::Response,
) -> KeycloakResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(KeycloakError::Api {
            method,
            path: path.to_string(),
            status: status.as_u16(),
            message,
        })
    }
}
