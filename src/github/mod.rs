//! GitHub integration module for GitHub App support.
//!
//! This module provides:
//! - JWT token generation for GitHub App authentication
//! - Installation access token exchange
//! - GitHub API client for the proxied read operations

pub mod api_client;
pub mod app;
pub mod error;
pub mod token_manager;

pub use api_client::{GitHubClient, GitHubHttp};
pub use app::GitHubApp;
pub use error::GitHubError;
pub use token_manager::{get_installation_token, AppClaims, AppCredentials, InstallationToken};
