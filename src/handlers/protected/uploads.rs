// handlers/protected/uploads.rs - POST/PUT /uploads handlers

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::database::models::{ModerationStatus, NewUpload, UserUpload};
use crate::database::{roles, teams, uploads};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::AppState;

const DEFAULT_TITLE_STATUS: &str = "ongoing";

#[derive(Debug, Deserialize)]
pub struct CreateUploadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub alternative_titles: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub artist: String,
    pub status: Option<String>,
    pub release_year: Option<i32>,
    pub team_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadAction {
    Update,
    Moderate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUploadRequest {
    pub upload_id: Option<i32>,
    pub action: Option<UploadAction>,
    pub moderation_status: Option<String>,
    #[serde(default)]
    pub moderation_notes: String,
    /// Remaining fields; only whitelisted upload columns are applied.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload: UserUpload,
}

/// POST /uploads - Submit a title for moderation
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateUploadRequest>,
) -> ApiResult<UploadResponse> {
    let title = body.title.trim();
    let cover_url = body.cover_url.trim();
    if title.is_empty() || cover_url.is_empty() {
        return Err(ApiError::bad_request("Title and cover_url are required"));
    }

    let new = NewUpload {
        title: title.to_string(),
        alternative_titles: body.alternative_titles,
        slug: teams::slugify(title),
        description: body.description,
        cover_url: cover_url.to_string(),
        author: body.author,
        artist: body.artist,
        status: body.status.unwrap_or_else(|| DEFAULT_TITLE_STATUS.to_string()),
        release_year: body.release_year,
        uploaded_by: user.user_id,
        team_id: body.team_id,
        genre_ids: body.genre_ids,
    };

    let upload = uploads::create_upload(&state.db, &new).await?;
    info!("Upload {} submitted by {}", upload.id, upload.uploaded_by);
    Ok(ApiResponse::created(UploadResponse { upload }))
}

/// PUT /uploads - Edit an upload (uploader) or moderate it (admin/moderator)
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<UpdateUploadRequest>,
) -> ApiResult<UploadResponse> {
    let upload_id = body.upload_id.ok_or_else(|| ApiError::bad_request("Upload ID required"))?;

    let owner = uploads::upload_owner(&state.db, upload_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload not found"))?;

    match body.action.unwrap_or(UploadAction::Update) {
        UploadAction::Moderate => {
            if !roles::is_staff(&state.db, &user.user_id).await? {
                return Err(ApiError::forbidden("Only moderators can moderate uploads"));
            }
            let status = body
                .moderation_status
                .as_deref()
                .and_then(ModerationStatus::parse)
                .ok_or_else(|| ApiError::bad_request("Invalid moderation status"))?;

            let upload = uploads::moderate_upload(&state.db, upload_id, status, &body.moderation_notes).await?;
            info!("Upload {} moderated as {} by {}", upload_id, status.as_str(), user.user_id);
            Ok(ApiResponse::success(UploadResponse { upload }))
        }
        UploadAction::Update => {
            if owner != user.user_id {
                return Err(ApiError::forbidden("Only uploader can update"));
            }
            let upload = uploads::update_upload(&state.db, upload_id, &body.fields)
                .await?
                .ok_or_else(|| ApiError::bad_request("No fields to update"))?;
            Ok(ApiResponse::success(UploadResponse { upload }))
        }
    }
}
