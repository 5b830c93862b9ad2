// handlers/protected/teams.rs - POST/PUT /teams handlers

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::database::models::{NewTeam, Team};
use crate::database::teams::{self, TEAM_ROLE_ADMIN, TEAM_ROLE_OWNER};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub discord_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub team_id: Option<i32>,
    /// Remaining fields; only whitelisted team columns are applied.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

/// POST /teams - Create a team with the caller as owner
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateTeamRequest>,
) -> ApiResult<TeamResponse> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Team name is required"));
    }

    let new = NewTeam {
        name: name.to_string(),
        slug: teams::slugify(name),
        description: body.description,
        logo_url: body.logo_url,
        website_url: body.website_url,
        discord_url: body.discord_url,
    };

    let team = teams::create_team(&state.db, &new, &user.user_id).await?;
    info!("Team {} ({}) created by {}", team.id, team.slug, user.user_id);
    Ok(ApiResponse::created(TeamResponse { team }))
}

/// PUT /teams - Update team profile fields (owner or team admin only)
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<UpdateTeamRequest>,
) -> ApiResult<TeamResponse> {
    let team_id = body.team_id.ok_or_else(|| ApiError::bad_request("Team ID required"))?;

    let role = teams::member_role(&state.db, team_id, &user.user_id).await?;
    if !matches!(role.as_deref(), Some(TEAM_ROLE_OWNER) | Some(TEAM_ROLE_ADMIN)) {
        return Err(ApiError::forbidden("Only team owner or admin can update team"));
    }

    let team = teams::update_team(&state.db, team_id, &body.fields)
        .await?
        .ok_or_else(|| ApiError::bad_request("No fields to update"))?;
    Ok(ApiResponse::success(TeamResponse { team }))
}
