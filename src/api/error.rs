//! Unified API error handling for hubgate.
//!
//! Every failing endpoint answers with the same JSON envelope:
//! `{"error": {"code", "message", "details"?}}`. Errors coming back from
//! GitHub carry the upstream status and body verbatim in `details`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::github::GitHubError;

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Client errors (4xx)
    BadRequest,
    Unauthorized,

    // Server errors (5xx)
    InternalError,
    ServiceUnavailable,
    ExternalServiceError,
    GatewayTimeout,
}

impl ErrorCode {
    /// Get the default HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,
            ErrorCode::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::ExternalServiceError => "external_service_error",
            ErrorCode::GatewayTimeout => "gateway_timeout",
        }
    }
}

/// The inner error object in the response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// The full error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    status: StatusCode,
    message: String,
    details: Option<HashMap<String, serde_json::Value>>,
}

impl ApiError {
    /// Create a new API error with a specific code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code(),
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an API error with a custom HTTP status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Unauthorized error (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Internal server error (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Service unavailable error (503)
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Upstream failure (502)
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceError, message)
    }

    fn with_upstream(self, status: StatusCode, body: &str) -> Self {
        // Keep JSON bodies structured; anything else is passed as a string.
        let body = serde_json::from_str::<serde_json::Value>(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
        self.with_detail("upstream_status", status.as_u16())
            .with_detail("upstream_body", body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = ErrorResponse {
            error: ErrorBody {
                code: self.code.as_str().to_string(),
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        match &err {
            GitHubError::UpstreamAuth { status, body } => {
                tracing::warn!(status = %status, "Installation token exchange failed");
                ApiError::bad_gateway("GitHub rejected the installation token request")
                    .with_upstream(*status, body)
            }
            GitHubError::UpstreamApi { status, body } => {
                tracing::warn!(status = %status, "GitHub API call failed");
                let api_error = ApiError::bad_gateway("GitHub API request failed")
                    .with_upstream(*status, body);
                if status.is_client_error() || status.is_server_error() {
                    api_error.with_status(*status)
                } else {
                    api_error
                }
            }
            GitHubError::Transport(e) if e.is_timeout() => {
                tracing::error!("GitHub request timed out: {}", e);
                ApiError::new(ErrorCode::GatewayTimeout, "GitHub did not respond in time")
            }
            GitHubError::Transport(e) => {
                tracing::error!("GitHub request failed: {}", e);
                ApiError::bad_gateway(format!("Failed to reach GitHub: {}", e))
            }
            GitHubError::Decode(e) => {
                tracing::error!("GitHub response body was not JSON: {}", e);
                ApiError::bad_gateway("GitHub returned a non-JSON body")
            }
            GitHubError::Signing(e) => {
                tracing::error!("Failed to sign app JWT: {}", e);
                ApiError::internal("Failed to sign GitHub App JWT")
            }
            GitHubError::InvalidPath(reason) => ApiError::bad_request(reason.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::ExternalServiceError.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::GatewayTimeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_custom_status_code() {
        let err = ApiError::new(ErrorCode::InternalError, "Custom error")
            .with_status(StatusCode::BAD_GATEWAY);

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn test_upstream_auth_maps_to_bad_gateway() {
        let err = ApiError::from(GitHubError::UpstreamAuth {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"message":"Bad credentials"}"#.to_string(),
        });
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "external_service_error");
        assert_eq!(body["error"]["details"]["upstream_status"], 401);
        assert_eq!(body["error"]["details"]["upstream_body"]["message"], "Bad credentials");
    }

    #[tokio::test]
    async fn test_upstream_api_status_is_mirrored() {
        let err = ApiError::from(GitHubError::UpstreamApi {
            status: StatusCode::NOT_FOUND,
            body: "Not Found".to_string(),
        });
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["details"]["upstream_body"], "Not Found");
    }

    #[tokio::test]
    async fn test_no_details_field_when_empty() {
        let (status, body) = body_json(ApiError::unauthorized("nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].get("details").is_none());
        assert_eq!(body["error"]["message"], "nope");
    }
}
