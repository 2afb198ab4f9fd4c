//! GitHub API client for installation-scoped read operations.
//!
//! `GitHubHttp` owns the single pooled `reqwest::Client` shared by every
//! request. `GitHubClient` pairs it with an installation access token.

use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;

use super::error::{GitHubError, Result};
use crate::config::GitHubConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Shared HTTP plumbing for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubHttp {
    client: reqwest::Client,
    base_url: Url,
    user_agent: String,
}

impl GitHubHttp {
    /// Build the pooled client with the configured timeout.
    pub fn new(config: &GitHubConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url, &config.user_agent)?)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GitHubError::InvalidPath(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidPath(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            user_agent: user_agent.to_string(),
        })
    }

    /// Join path segments onto the API base URL.
    ///
    /// Each segment is percent-encoded, so a caller-supplied `org` can never
    /// reach a different upstream path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        for segment in segments {
            check_segment(segment)?;
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidPath(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the standard GitHub headers and a bearer credential.
    pub fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(bearer)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", self.user_agent.as_str())
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

/// Reject path segments that would be dropped or collapsed when joined.
pub fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(GitHubError::InvalidPath(format!("invalid path segment {:?}", segment)));
    }
    Ok(())
}

/// GitHub API client authenticated with an installation access token.
pub struct GitHubClient<'a> {
    http: &'a GitHubHttp,
    access_token: String,
}

impl<'a> GitHubClient<'a> {
    pub fn new(http: &'a GitHubHttp, access_token: String) -> Self {
        Self { http, access_token }
    }

    /// Make an authenticated GET request and return the JSON body untouched.
    async fn get(&self, segments: &[&str]) -> Result<Value> {
        let url = self.http.endpoint(segments)?;
        tracing::debug!(path = %url.path(), "GitHub API request");

        let response = self
            .http
            .request(Method::GET, url, &self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::UpstreamApi { status, body });
        }

        response.json().await.map_err(GitHubError::from_body)
    }

    /// List members of an organization.
    pub async fn list_org_members(&self, org: &str) -> Result<Value> {
        self.get(&["orgs", org, "members"]).await
    }

    /// List repositories the installation has access to.
    pub async fn list_installation_repositories(&self) -> Result<Value> {
        self.get(&["installation", "repositories"]).await
    }

    /// List installations visible to the authenticated token.
    pub async fn list_user_installations(&self) -> Result<Value> {
        self.get(&["user", "installations"]).await
    }

    /// Get an organization's profile, including its 2FA requirement.
    pub async fn get_org(&self, org: &str) -> Result<Value> {
        self.get(&["orgs", org]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(base: &str) -> GitHubHttp {
        GitHubHttp::with_client(reqwest::Client::new(), base, "hubgate-test").unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = http("https://api.github.com").endpoint(&["orgs", "acme", "members"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/orgs/acme/members");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = http("https://ghe.example.com/api/v3/").endpoint(&["orgs", "acme"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/orgs/acme");
    }

    #[test]
    fn test_endpoint_encodes_slashes() {
        let url = http("https://api.github.com").endpoint(&["orgs", "acme/../admin"]).unwrap();
        assert_eq!(url.path(), "/orgs/acme%2F..%2Fadmin");
    }

    #[test]
    fn test_endpoint_rejects_dot_segments() {
        let http = http("https://api.github.com");
        assert!(matches!(http.endpoint(&["orgs", ".."]), Err(GitHubError::InvalidPath(_))));
        assert!(matches!(http.endpoint(&["orgs", ""]), Err(GitHubError::InvalidPath(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GitHubHttp::with_client(reqwest::Client::new(), "not a url", "ua");
        assert!(result.is_err());
        let result = GitHubHttp::with_client(reqwest::Client::new(), "mailto:ops@example.com", "ua");
        assert!(result.is_err());
    }
}
