use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;

use super::error::ApiError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
const EVENT_HEADER: &str = "X-GitHub-Event";
const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook secret is not configured")]
    NotConfigured,
    #[error("missing X-Hub-Signature-256 header")]
    MissingSignature,
    #[error("webhook signature verification failed")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    Malformed(String),
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::NotConfigured => {
                ApiError::service_unavailable("Webhook receiver has no secret configured")
            }
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                ApiError::unauthorized(err.to_string())
            }
            WebhookError::Malformed(_) => ApiError::bad_request(err.to_string()),
        }
    }
}

/// Verify GitHub webhook signature (X-Hub-Signature-256 header)
pub fn verify_github_signature(secret: &str, signature_header: &str, payload: &[u8]) -> bool {
    // Signature format: sha256=<hex>
    let signature = match signature_header.strip_prefix("sha256=") {
        Some(sig) => sig,
        None => return false,
    };

    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    // Use constant-time comparison
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `sha256=<hex>` signature GitHub sends for `payload`.
#[cfg(test)]
pub(crate) fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Installation event payload. Only the fields this service reads are modeled.
#[derive(Debug, Deserialize)]
pub struct GitHubInstallationPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub installation: Option<GitHubInstallation>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubInstallation {
    pub id: Option<i64>,
    pub account: Option<GitHubAccount>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubAccount {
    pub login: Option<String>,
}

/// A newly created installation, extracted from a `created` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationEvent {
    pub action: String,
    pub installation_id: i64,
    pub org_login: String,
}

impl GitHubInstallationPayload {
    /// Extract the installation created by this delivery, if it is one.
    ///
    /// Returns `Ok(None)` for any action other than `created`.
    pub fn created_installation(&self) -> Result<Option<InstallationEvent>, WebhookError> {
        if self.action.as_deref() != Some("created") {
            return Ok(None);
        }

        let installation = self
            .installation
            .as_ref()
            .ok_or_else(|| WebhookError::Malformed("missing installation".to_string()))?;
        let installation_id = installation
            .id
            .ok_or_else(|| WebhookError::Malformed("missing installation.id".to_string()))?;
        let org_login = installation
            .account
            .as_ref()
            .and_then(|a| a.login.clone())
            .ok_or_else(|| {
                WebhookError::Malformed("missing installation.account.login".to_string())
            })?;

        Ok(Some(InstallationEvent {
            action: "created".to_string(),
            installation_id,
            org_login,
        }))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /webhook
pub async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let secret = state.config.webhooks.github_secret.as_deref().ok_or_else(|| {
        tracing::warn!("GitHub webhook rejected: no webhook secret configured");
        WebhookError::NotConfigured
    })?;

    let signature = header_str(&headers, SIGNATURE_HEADER).ok_or_else(|| {
        tracing::warn!("GitHub webhook missing X-Hub-Signature-256 header");
        WebhookError::MissingSignature
    })?;

    if !verify_github_signature(secret, signature, &body) {
        tracing::warn!("GitHub webhook signature verification failed");
        return Err(WebhookError::InvalidSignature.into());
    }
    tracing::debug!("GitHub webhook signature verified");

    let event = header_str(&headers, EVENT_HEADER).unwrap_or("unknown");
    let delivery = header_str(&headers, DELIVERY_HEADER).unwrap_or("unknown");

    let payload: GitHubInstallationPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Failed to parse GitHub webhook payload: {}", e);
        WebhookError::Malformed(e.to_string())
    })?;

    match payload.created_installation()? {
        Some(installation) => {
            tracing::info!(
                event,
                delivery,
                installation_id = installation.installation_id,
                org = %installation.org_login,
                "GitHub App installed"
            );
        }
        None => {
            tracing::debug!(
                event,
                delivery,
                action = payload.action.as_deref().unwrap_or("none"),
                installation_id = ?payload.installation.as_ref().and_then(|i| i.id),
                "Ignoring GitHub webhook"
            );
        }
    }

    Ok(Json(json!({ "status": "ok" })))
}
