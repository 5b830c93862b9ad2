use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::catalog;
use crate::database::models::ManhwaRef;
use crate::database::moderation::{self, MANHWA_COLUMNS};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddChapterParams {
    pub manhwa_id: Option<i32>,
    pub chapter_number: Option<i32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AddChapterResponse {
    pub message: String,
    pub chapter_id: i32,
    pub pages_added: usize,
    pub manhwa: ManhwaRef,
}

#[derive(Debug, Deserialize)]
pub struct UpdateManhwaParams {
    pub manhwa_id: Option<i32>,
    pub genres: Option<Vec<String>>,
    /// Everything else; only whitelisted catalog columns are applied.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateManhwaResponse {
    pub message: &'static str,
    pub updated_fields: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCoverParams {
    pub manhwa_id: Option<i32>,
    pub cover_url: Option<String>,
}

/// Insert a chapter with its pages, audit it, and notify subscribers, all in
/// one transaction.
pub async fn add_chapter(state: &AppState, user_id: Option<&str>, params: AddChapterParams) -> Result<Response, ApiError> {
    let (Some(manhwa_id), Some(chapter_number)) = (params.manhwa_id, params.chapter_number) else {
        return Err(ApiError::bad_request("manhwa_id and chapter_number required"));
    };

    let mut tx = state.db.begin().await?;

    let manhwa = catalog::find_title_for_update(&mut *tx, manhwa_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Manhwa not found"))?;

    if catalog::chapter_exists(&mut *tx, manhwa_id, chapter_number).await? {
        return Err(ApiError::conflict(format!("Chapter {} already exists", chapter_number)));
    }

    let chapter_id =
        catalog::insert_chapter_with_pages(&mut *tx, manhwa_id, chapter_number, params.title.trim(), &params.pages)
            .await?;
    let pages_added = params.pages.len();

    if user_id.is_some() {
        let changes = format!("Added chapter {} with {} pages", chapter_number, pages_added);
        moderation::log_change(&mut *tx, "chapter", chapter_id, "created", user_id, &changes).await?;
    }

    let notified = moderation::notify_new_chapter(&mut *tx, &manhwa, chapter_id, chapter_number).await?;
    tx.commit().await?;

    info!(
        "Chapter {} (#{}) added to '{}' with {} pages; {} subscribers notified",
        chapter_id, chapter_number, manhwa.title, pages_added, notified
    );

    Ok(ApiResponse::created(AddChapterResponse {
        message: format!("Chapter {} added successfully", chapter_number),
        chapter_id,
        pages_added,
        manhwa,
    })
    .into_response())
}

/// Update the supplied catalog fields; `genres`, when present, replaces the genre set.
pub async fn update_manhwa(state: &AppState, user_id: Option<&str>, params: UpdateManhwaParams) -> Result<Response, ApiError> {
    let manhwa_id = params.manhwa_id.ok_or_else(|| ApiError::bad_request("manhwa_id required"))?;

    let has_columns = MANHWA_COLUMNS.iter().any(|c| params.fields.contains_key(c.name));
    if !has_columns && params.genres.is_none() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let mut tx = state.db.begin().await?;
    if catalog::find_title_for_update(&mut *tx, manhwa_id).await?.is_none() {
        return Err(ApiError::not_found("Manhwa not found"));
    }

    let mut updated_fields = moderation::update_manhwa_fields(&mut *tx, manhwa_id, &params.fields).await?;
    if let Some(genres) = &params.genres {
        catalog::replace_genres(&mut *tx, manhwa_id, genres).await?;
        updated_fields.push("genres");
    }

    if user_id.is_some() {
        let changes = format!("Updated fields: {}", updated_fields.join(", "));
        moderation::log_change(&mut *tx, "manhwa", manhwa_id, "updated", user_id, &changes).await?;
    }
    tx.commit().await?;

    Ok(ApiResponse::success(UpdateManhwaResponse {
        message: "Manhwa updated successfully",
        updated_fields,
    })
    .into_response())
}

pub async fn update_cover(state: &AppState, params: UpdateCoverParams) -> Result<Response, ApiError> {
    let cover_url = params.cover_url.as_deref().map(str::trim).unwrap_or_default();
    let Some(manhwa_id) = params.manhwa_id.filter(|_| !cover_url.is_empty()) else {
        return Err(ApiError::bad_request("manhwa_id and cover_url required"));
    };

    moderation::update_cover(&state.db, manhwa_id, cover_url).await?;
    Ok(ApiResponse::success(json!({ "message": "Cover updated successfully" })).into_response())
}

/// `parse_chapters` and `sync_chapters`: remote scraping is not available.
pub fn not_supported() -> Response {
    ApiResponse::with_status(
        json!({
            "success": false,
            "error": "Feature in development",
            "note": "Use add_chapter to add chapters manually; importing from remote sources is not supported",
        }),
        StatusCode::NOT_IMPLEMENTED,
    )
    .into_response()
}
