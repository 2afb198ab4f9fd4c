//! The GitHub App as seen by request handlers: token issuer plus proxy calls.

use serde_json::Value;

use super::api_client::{check_segment, GitHubClient, GitHubHttp};
use super::error::Result;
use super::token_manager::{get_installation_token, AppCredentials, InstallationToken};

/// Immutable GitHub App handle shared across requests.
#[derive(Debug, Clone)]
pub struct GitHubApp {
    credentials: AppCredentials,
    http: GitHubHttp,
}

impl GitHubApp {
    pub fn new(credentials: AppCredentials, http: GitHubHttp) -> Self {
        Self { credentials, http }
    }

    pub fn app_id(&self) -> &str {
        self.credentials.app_id()
    }

    /// Exchange a new app JWT for an installation access token.
    pub async fn issue_installation_token(&self, installation_id: i64) -> Result<InstallationToken> {
        get_installation_token(&self.http, &self.credentials, installation_id).await
    }

    /// Authenticate as the installation and return a client bound to that token.
    pub async fn installation_client(&self, installation_id: i64) -> Result<GitHubClient<'_>> {
        let token = self.issue_installation_token(installation_id).await?;
        Ok(GitHubClient::new(&self.http, token.token))
    }

    pub async fn list_org_members(&self, org: &str, installation_id: i64) -> Result<Value> {
        check_segment(org)?;
        self.installation_client(installation_id)
            .await?
            .list_org_members(org)
            .await
    }

    pub async fn list_installation_repositories(&self, installation_id: i64) -> Result<Value> {
        self.installation_client(installation_id)
            .await?
            .list_installation_repositories()
            .await
    }

    pub async fn list_user_installations(&self, installation_id: i64) -> Result<Value> {
        self.installation_client(installation_id)
            .await?
            .list_user_installations()
            .await
    }

    pub async fn get_org(&self, org: &str, installation_id: i64) -> Result<Value> {
        check_segment(org)?;
        self.installation_client(installation_id)
            .await?
            .get_org(org)
            .await
    }
}
