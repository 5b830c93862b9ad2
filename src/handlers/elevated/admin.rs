// handlers/elevated/admin.rs - POST /admin handler (catalog management)

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::catalog;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub action: Option<String>,
    // add_manhwa
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub genres: Vec<String>,
    // add_chapter
    pub manhwa_id: Option<i32>,
    pub chapter_number: Option<i32>,
    #[serde(default)]
    pub pages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manhwa_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<i32>,
}

/// POST /admin - `add_manhwa` or `add_chapter`
pub async fn post(State(state): State<AppState>, JsonBody(body): JsonBody<AdminRequest>) -> ApiResult<AdminResponse> {
    match body.action.as_deref() {
        Some("add_manhwa") => add_manhwa(&state, body).await,
        Some("add_chapter") => add_chapter(&state, body).await,
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

async fn add_manhwa(state: &AppState, body: AdminRequest) -> ApiResult<AdminResponse> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let mut tx = state.db.begin().await?;
    let manhwa_id = catalog::insert_manhwa(&mut *tx, title, &body.description, &body.cover_url).await?;
    catalog::add_genres(&mut *tx, manhwa_id, &body.genres).await?;
    tx.commit().await?;

    info!("Added manhwa {} ({})", manhwa_id, title);
    Ok(ApiResponse::success(AdminResponse {
        success: true,
        manhwa_id: Some(manhwa_id),
        chapter_id: None,
    }))
}

async fn add_chapter(state: &AppState, body: AdminRequest) -> ApiResult<AdminResponse> {
    let (Some(manhwa_id), Some(chapter_number)) = (body.manhwa_id, body.chapter_number) else {
        return Err(ApiError::bad_request("manhwa_id and chapter_number are required"));
    };
    let title = body.title.unwrap_or_default();

    let mut tx = state.db.begin().await?;
    if catalog::find_title_for_update(&mut *tx, manhwa_id).await?.is_none() {
        return Err(ApiError::not_found("Manhwa not found"));
    }
    let chapter_id =
        catalog::insert_chapter_with_pages(&mut *tx, manhwa_id, chapter_number, title.trim(), &body.pages).await?;
    tx.commit().await?;

    info!("Added chapter {} (#{}) with {} pages to manhwa {}", chapter_id, chapter_number, body.pages.len(), manhwa_id);
    Ok(ApiResponse::success(AdminResponse {
        success: true,
        manhwa_id: None,
        chapter_id: Some(chapter_id),
    }))
}
