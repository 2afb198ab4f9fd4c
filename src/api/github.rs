//! Proxy endpoints that call GitHub on behalf of an installation.
//!
//! Each request authenticates from scratch: a new app JWT is signed, exchanged
//! for an installation token, and used for exactly one upstream GET.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InstallationQuery {
    pub installation_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct OrgQuery {
    pub installation_id: i64,
    pub org: String,
}

/// GET /org/:org/members?installation_id=
pub async fn org_members(
    State(state): State<Arc<AppState>>,
    Path(org): Path<String>,
    Query(query): Query<InstallationQuery>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(org = %org, installation_id = query.installation_id, "Fetching org members");
    let members = state
        .github
        .list_org_members(&org, query.installation_id)
        .await?;
    Ok(Json(members))
}

/// GET /repos?installation_id=
pub async fn installation_repositories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InstallationQuery>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(installation_id = query.installation_id, "Fetching installation repositories");
    let repos = state
        .github
        .list_installation_repositories(query.installation_id)
        .await?;
    Ok(Json(repos))
}

/// GET /access?installation_id=
pub async fn user_installations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InstallationQuery>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(installation_id = query.installation_id, "Fetching user installations");
    let installations = state
        .github
        .list_user_installations(query.installation_id)
        .await?;
    Ok(Json(installations))
}

/// GET /mfa?installation_id=&org=
///
/// Returns the organization profile; callers read
/// `two_factor_requirement_enabled` from it.
pub async fn org_mfa(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(org = %query.org, installation_id = query.installation_id, "Fetching org");
    let org = state.github.get_org(&query.org, query.installation_id).await?;
    Ok(Json(org))
}
