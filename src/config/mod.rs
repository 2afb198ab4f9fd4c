use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub App ID, used as the `iss` claim of the app JWT
    #[serde(default)]
    pub app_id: String,
    /// PEM file holding the app's RSA private key
    #[serde(default = "default_private_key_path")]
    pub private_key_path: PathBuf,
    /// Base URL of the GitHub REST API (override for GitHub Enterprise or tests)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout applied to every outbound GitHub request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl GitHubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            private_key_path: default_private_key_path(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("github_app.pem")
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    "hubgate".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Secret for verifying GitHub webhook signatures (HMAC-SHA256)
    pub github_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment.
/// Anything set here wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub app_id: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub webhook_secret: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(app_id) = overrides.app_id {
            self.github.app_id = app_id;
        }
        if let Some(path) = overrides.private_key_path {
            self.github.private_key_path = path;
        }
        if let Some(secret) = overrides.webhook_secret {
            self.webhooks.github_secret = Some(secret);
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.github.app_id.trim().is_empty() {
            anyhow::bail!("GitHub App ID is not set (use GITHUB_APP_ID or [github].app_id)");
        }
        if self.github.request_timeout_secs == 0 {
            anyhow::bail!("github.request_timeout_secs must be greater than zero");
        }
        if self.github.api_base_url.trim().is_empty() {
            anyhow::bail!("github.api_base_url must not be empty");
        }
        Ok(())
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            github: GitHubConfig::default(),
            webhooks: WebhookConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
