use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::database::models::{Submission, TranslatorRequestListing};
use crate::database::{catalog, moderation};
use crate::database::moderation::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::AppState;

const DUPLICATE_TITLE: &str = "Duplicate title detected";
const NO_REASON: &str = "Not specified";

#[derive(Debug, Deserialize)]
pub struct SubmissionParams {
    pub submission_id: Option<i32>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslatorParams {
    pub request_id: Option<i32>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<Submission>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TranslatorRequestsResponse {
    pub requests: Vec<TranslatorRequestListing>,
    pub total: usize,
}

pub async fn get_submissions(state: &AppState) -> Result<Response, ApiError> {
    let submissions = moderation::pending_submissions(&state.db).await?;
    let total = submissions.len();
    Ok(ApiResponse::success(SubmissionsResponse { submissions, total }).into_response())
}

/// Create a catalog entry from a pending submission.
///
/// A submission whose title (or any alternative title) already exists is
/// rejected on the spot and reported as a conflict.
pub async fn approve_submission(state: &AppState, user_id: Option<&str>, params: SubmissionParams) -> Result<Response, ApiError> {
    let submission_id = params.submission_id.ok_or_else(|| ApiError::bad_request("submission_id required"))?;

    let mut tx = state.db.begin().await?;
    let submission = moderation::find_submission_for_update(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Submission not found"))?;

    if submission.status != STATUS_PENDING {
        return Err(ApiError::bad_request(format!("Submission already {}", submission.status)));
    }

    if moderation::title_exists(&mut *tx, &submission.title, submission.alternative_titles.as_deref()).await? {
        moderation::reject_submission(&mut *tx, submission_id, DUPLICATE_TITLE, user_id).await?;
        tx.commit().await?;
        info!("Submission {} auto-rejected: '{}' already exists", submission_id, submission.title);
        return Err(ApiError::conflict(DUPLICATE_TITLE));
    }

    let manhwa_id = catalog::insert_manhwa(
        &mut *tx,
        &submission.title,
        submission.description.as_deref().unwrap_or_default(),
        submission.cover_url.as_deref().unwrap_or_default(),
    )
    .await?;
    moderation::approve_submission(&mut *tx, submission_id, manhwa_id, user_id).await?;
    let changes = format!("Approved submission #{}", submission_id);
    moderation::log_change(&mut *tx, "manhwa", manhwa_id, "created", user_id, &changes).await?;
    tx.commit().await?;

    info!("Submission {} approved as manhwa {}", submission_id, manhwa_id);
    Ok(ApiResponse::success(json!({
        "message": "Submission approved",
        "manhwa_id": manhwa_id
    }))
    .into_response())
}

pub async fn reject_submission(state: &AppState, user_id: Option<&str>, params: SubmissionParams) -> Result<Response, ApiError> {
    let submission_id = params.submission_id.ok_or_else(|| ApiError::bad_request("submission_id required"))?;
    let reason = params.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()).unwrap_or(NO_REASON);

    let mut conn = state.db.acquire().await?;
    if !moderation::reject_submission(&mut *conn, submission_id, reason, user_id).await? {
        return Err(ApiError::bad_request("Submission not found or not pending"));
    }

    Ok(ApiResponse::success(json!({ "message": "Submission rejected" })).into_response())
}

pub async fn get_translator_requests(state: &AppState) -> Result<Response, ApiError> {
    let requests = moderation::pending_translator_requests(&state.db).await?;
    let total = requests.len();
    Ok(ApiResponse::success(TranslatorRequestsResponse { requests, total }).into_response())
}

pub async fn approve_translator(state: &AppState, user_id: Option<&str>, params: TranslatorParams) -> Result<Response, ApiError> {
    let request_id = params.request_id.ok_or_else(|| ApiError::bad_request("request_id required"))?;

    let mut tx = state.db.begin().await?;
    let request = moderation::find_translator_request_for_update(&mut *tx, request_id)
        .await?
        .filter(|r| r.status == STATUS_PENDING)
        .ok_or_else(|| ApiError::bad_request("Invalid request"))?;

    moderation::resolve_translator_request(&mut *tx, request_id, STATUS_APPROVED, user_id).await?;
    let changes = format!("Changed translator for manhwa {}", request.manhwa_id);
    moderation::log_change(&mut *tx, "translator_request", request_id, "approved", user_id, &changes).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(json!({ "message": "Translator change approved" })).into_response())
}

pub async fn reject_translator(state: &AppState, user_id: Option<&str>, params: TranslatorParams) -> Result<Response, ApiError> {
    let request_id = params.request_id.ok_or_else(|| ApiError::bad_request("request_id required"))?;
    let reason = params.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()).unwrap_or(NO_REASON);

    let mut tx = state.db.begin().await?;
    if !moderation::resolve_translator_request(&mut *tx, request_id, STATUS_REJECTED, user_id).await? {
        return Err(ApiError::bad_request("Invalid request"));
    }
    moderation::log_change(&mut *tx, "translator_request", request_id, "rejected", user_id, reason).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(json!({ "message": "Translator change rejected" })).into_response())
}
