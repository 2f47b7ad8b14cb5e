//! Client-credentials session against a Solid identity provider.
//!
//! The session discovers the provider's token endpoint through OpenID
//! discovery, exchanges the client id and secret for an access token, and
//! caches that token until shortly before it expires.
//!
//! The client secret and the access token are wrapped in [`SecretString`]
//! and never appear in Debug output or tracing logs.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use expense_types::config::AuthFlow;
use expense_types::error::PodError;

use super::transport_error;

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 300;

/// Upper bound on the advertised token lifetime.
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Everything needed to log in as the gateway's client application.
#[derive(Debug)]
pub struct SolidCredentials {
    /// Identity provider (OIDC issuer) base URI.
    pub issuer: Url,
    pub client_id: String,
    pub client_secret: SecretString,
    pub flow: AuthFlow,
}

/// A cached access token.
struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct OidcDiscovery {
    token_endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Authenticated session shared by every request the gateway makes.
pub struct SolidSession {
    http: reqwest::Client,
    credentials: SolidCredentials,
    token: RwLock<Option<AccessToken>>,
}

impl SolidSession {
    pub fn new(http: reqwest::Client, credentials: SolidCredentials) -> Self {
        Self {
            http,
            credentials,
            token: RwLock::new(None),
        }
    }

    /// A valid access token, fetching a new one if none is cached or the
    /// cached one is about to expire.
    pub async fn access_token(&self) -> Result<SecretString, PodError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call logs in again.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    fn discovery_url(&self) -> Result<Url, PodError> {
        let base = self.credentials.issuer.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/.well-known/openid-configuration"))
            .map_err(|e| PodError::Unauthorized(format!("invalid issuer URI: {e}")))
    }

    async fn discover_token_endpoint(&self) -> Result<Url, PodError> {
        let url = self.discovery_url()?;
        let response = self.http.get(url.clone()).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PodError::Unauthorized(format!(
                "OpenID discovery at {url} failed with HTTP {status}"
            )));
        }

        let discovery: OidcDiscovery = response.json().await.map_err(|e| {
            PodError::MalformedPayload(format!("failed to parse OpenID configuration: {e}"))
        })?;
        Ok(discovery.token_endpoint)
    }

    async fn request_token(&self) -> Result<AccessToken, PodError> {
        let endpoint = self.discover_token_endpoint().await?;
        tracing::debug!(
            issuer = %self.credentials.issuer,
            flow = %self.credentials.flow,
            "requesting client-credentials access token"
        );

        let credentials = &self.credentials;
        let request = self.http.post(endpoint.clone());
        let request = match credentials.flow {
            AuthFlow::ClientSecretBasic => request
                .basic_auth(
                    &credentials.client_id,
                    Some(credentials.client_secret.expose_secret()),
                )
                .form(&[("grant_type", "client_credentials")]),
            AuthFlow::ClientSecretPost => request.form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.expose_secret()),
            ]),
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, "token request rejected");
            return Err(PodError::Unauthorized(format!(
                "token endpoint {endpoint} answered HTTP {status}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PodError::MalformedPayload(format!("failed to parse token response: {e}"))
        })?;

        let lifetime = token
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .clamp(0, MAX_TOKEN_LIFETIME_SECS);
        tracing::info!(
            issuer = %self.credentials.issuer,
            token_type = token.token_type.as_deref().unwrap_or("Bearer"),
            expires_in = lifetime,
            "obtained access token"
        );

        Ok(AccessToken {
            value: SecretString::from(token.access_token),
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}
