// handlers/public/uploads.rs - GET /uploads handler

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::database::models::{ModerationStatus, UploadDetails, UploadListing};
use crate::database::uploads;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, QueryParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadsQuery {
    pub upload_id: Option<i32>,
    /// Only uploads submitted by this user.
    pub user_id: Option<String>,
    /// `all` (default), `pending`, `approved` or `rejected`.
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload: UploadDetails,
}

#[derive(Debug, Serialize)]
pub struct UploadListResponse {
    pub uploads: Vec<UploadListing>,
}

/// GET /uploads - One upload by id, or a filtered list
pub async fn get(State(state): State<AppState>, QueryParams(query): QueryParams<UploadsQuery>) -> Result<Response, ApiError> {
    if let Some(upload_id) = query.upload_id {
        let upload = uploads::find_upload(&state.db, upload_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Upload not found"))?;
        return Ok(ApiResponse::success(UploadResponse { upload }).into_response());
    }

    let status = parse_status_filter(query.status.as_deref())?;
    let user_id = query.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let uploads = uploads::list_uploads(&state.db, user_id, status).await?;
    Ok(ApiResponse::success(UploadListResponse { uploads }).into_response())
}

fn parse_status_filter(value: Option<&str>) -> Result<Option<ModerationStatus>, ApiError> {
    match value {
        None | Some("") | Some("all") => Ok(None),
        Some(other) => ModerationStatus::parse(other)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid status filter: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_accepts_all_and_known_states() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(parse_status_filter(Some("approved")).unwrap(), Some(ModerationStatus::Approved));
        assert_eq!(parse_status_filter(Some("archived")).unwrap_err().status_code(), 400);
    }
}
