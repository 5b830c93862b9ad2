// handlers/public/teams.rs - GET /teams handler

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::database::models::{TeamMember, TeamSummary};
use crate::database::teams;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, QueryParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    pub team_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Serialize)]
pub struct TeamDetailsResponse {
    pub team: TeamSummary,
    pub members: Vec<TeamMember>,
}

/// GET /teams - All teams, or one team with its members when `team_id` is given
pub async fn get(State(state): State<AppState>, QueryParams(query): QueryParams<TeamsQuery>) -> Result<Response, ApiError> {
    let Some(team_id) = query.team_id else {
        let teams = teams::list_teams(&state.db).await?;
        return Ok(ApiResponse::success(TeamListResponse { teams }).into_response());
    };

    let team = teams::find_team(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team not found"))?;
    let members = teams::team_members(&state.db, team_id).await?;

    Ok(ApiResponse::success(TeamDetailsResponse { team, members }).into_response())
}
