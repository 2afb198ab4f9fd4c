pub mod error;
mod github;
pub mod webhooks;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/webhook", post(webhooks::github_webhook))
        .route("/org/:org/members", get(github::org_members))
        .route("/repos", get(github::installation_repositories))
        .route("/access", get(github::user_installations))
        .route("/mfa", get(github::org_mfa))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "GitHub App Backend Running ✅" }))
}
