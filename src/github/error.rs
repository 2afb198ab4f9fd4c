//! Errors raised while talking to the GitHub API.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    /// The installation token exchange was rejected by GitHub.
    #[error("GitHub rejected installation token request: {status} - {body}")]
    UpstreamAuth { status: StatusCode, body: String },

    /// A proxied API call returned a non-success status.
    #[error("GitHub API error: {status} - {body}")]
    UpstreamApi { status: StatusCode, body: String },

    #[error("Failed to sign app JWT: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to reach GitHub: {0}")]
    Transport(#[from] reqwest::Error),

    /// GitHub answered with a success status but the body was not JSON.
    #[error("GitHub returned a non-JSON body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Invalid request path: {0}")]
    InvalidPath(String),
}

impl GitHubError {
    /// Classify an error raised while reading a response body.
    pub fn from_body(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GitHubError::Decode(err)
        } else {
            GitHubError::Transport(err)
        }
    }

    /// Upstream status and body, when GitHub answered with an error.
    pub fn upstream(&self) -> Option<(StatusCode, &str)> {
        match self {
            GitHubError::UpstreamAuth { status, body } | GitHubError::UpstreamApi { status, body } => {
                Some((*status, body.as_str()))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;
