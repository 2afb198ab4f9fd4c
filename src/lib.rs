pub mod api;
pub mod config;
pub mod github;

use anyhow::Result;
use config::Config;

use crate::github::{AppCredentials, GitHubApp, GitHubHttp};

/// Process-wide state, immutable after startup and shared via `Arc`.
pub struct AppState {
    pub config: Config,
    pub github: GitHubApp,
}

impl AppState {
    pub fn new(config: Config, github: GitHubApp) -> Self {
        Self { config, github }
    }

    /// Load the signing key and build the pooled HTTP client from `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let credentials =
            AppCredentials::load(config.github.app_id.clone(), &config.github.private_key_path)?;
        let http = GitHubHttp::new(&config.github)?;
        Ok(Self::new(config, GitHubApp::new(credentials, http)))
    }
}
