//! Token management for GitHub App authentication.
//!
//! GitHub Apps use two types of authentication:
//! 1. App JWT - Short-lived JWT signed with the app's private key (for app-level operations)
//! 2. Installation Access Token - Token for a specific installation (for API calls on its behalf)

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::api_client::GitHubHttp;
use super::error::{GitHubError, Result};

/// How far the JWT's `iat` is backdated to tolerate clock drift with GitHub.
pub const JWT_BACKDATE_SECS: i64 = 60;

/// Lifetime of the JWT past "now". GitHub rejects anything over 10 minutes.
pub const JWT_LIFETIME_SECS: i64 = 600;

/// JWT claims for GitHub App authentication.
/// GitHub requires: iat (issued at), exp (expiration), iss (issuer = app_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer - the GitHub App ID
    pub iss: String,
}

impl AppClaims {
    /// Claims for a JWT minted at `now`.
    pub fn issued_at(app_id: &str, now: DateTime<Utc>) -> Self {
        let iat = now - Duration::seconds(JWT_BACKDATE_SECS);
        let exp = now + Duration::seconds(JWT_LIFETIME_SECS);

        Self {
            iat: iat.timestamp(),
            exp: exp.timestamp(),
            iss: app_id.to_string(),
        }
    }

    /// Total validity window of the assertion in seconds.
    pub fn lifetime(&self) -> i64 {
        self.exp - self.iat
    }
}

/// The app's identity: its ID plus the parsed RSA signing key.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppCredentials {
    app_id: String,
    key: EncodingKey,
}

impl AppCredentials {
    /// Parse credentials from an in-memory PEM (PKCS#1 or PKCS#8).
    pub fn from_pem(app_id: impl Into<String>, private_key_pem: &[u8]) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem)?;
        Ok(Self {
            app_id: app_id.into(),
            key,
        })
    }

    /// Read and parse the private key file.
    pub fn load(app_id: impl Into<String>, path: &Path) -> anyhow::Result<Self> {
        let pem = std::fs::read(path)
            .with_context(|| format!("Failed to read private key: {}", path.display()))?;
        Self::from_pem(app_id, &pem)
            .with_context(|| format!("Failed to parse private key PEM: {}", path.display()))
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Sign a fresh app JWT valid from now.
    ///
    /// The JWT is signed with RS256 (RSA-SHA256) and is valid from 60 seconds
    /// in the past until 10 minutes from now.
    ///
    /// # Example
    /// ```ignore
    /// let jwt = credentials.generate_jwt()?;
    /// // Use: Authorization: Bearer {jwt}
    /// ```
    pub fn generate_jwt(&self) -> Result<String> {
        self.generate_jwt_at(Utc::now())
    }

    pub fn generate_jwt_at(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AppClaims::issued_at(&self.app_id, now);
        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;
        Ok(token)
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Response from GitHub's installation access token endpoint.
#[derive(Clone, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub permissions: serde_json::Value,
    #[serde(default)]
    pub repository_selection: Option<String>,
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("repository_selection", &self.repository_selection)
            .finish()
    }
}

/// Exchange a freshly signed app JWT for an installation access token.
///
/// Every call signs a new JWT and performs one round trip; nothing is cached.
pub async fn get_installation_token(
    http: &GitHubHttp,
    credentials: &AppCredentials,
    installation_id: i64,
) -> Result<InstallationToken> {
    let jwt = credentials.generate_jwt()?;
    let id = installation_id.to_string();
    let url = http.endpoint(&["app", "installations", &id, "access_tokens"])?;

    let response = http.request(Method::POST, url, &jwt).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            installation_id,
            status = %status,
            "GitHub rejected installation token request"
        );
        return Err(GitHubError::UpstreamAuth { status, body });
    }

    let token: InstallationToken = response.json().await.map_err(GitHubError::from_body)?;
    tracing::debug!(
        installation_id,
        expires_at = ?token.expires_at,
        "Obtained installation access token"
    );

    Ok(token)
}
