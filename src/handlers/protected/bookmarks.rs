// handlers/protected/bookmarks.rs - GET/POST/DELETE /bookmarks handlers

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::bookmarks;
use crate::database::models::Bookmark;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, QueryParams};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BookmarksResponse {
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBookmarkRequest {
    pub manhwa_id: Option<i32>,
    pub chapter_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SaveBookmarkResponse {
    pub success: bool,
    pub bookmark_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveBookmarkQuery {
    pub manhwa_id: Option<i32>,
}

/// GET /bookmarks - The caller's bookmarks, newest first
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<BookmarksResponse> {
    let bookmarks = bookmarks::list_bookmarks(&state.db, &user.user_id).await?;
    Ok(ApiResponse::success(BookmarksResponse { bookmarks }))
}

/// POST /bookmarks - Create or move the caller's bookmark on a title
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<SaveBookmarkRequest>,
) -> ApiResult<SaveBookmarkResponse> {
    let manhwa_id = body.manhwa_id.ok_or_else(|| ApiError::bad_request("manhwa_id is required"))?;

    let bookmark_id = bookmarks::upsert_bookmark(&state.db, &user.user_id, manhwa_id, body.chapter_id).await?;
    Ok(ApiResponse::success(SaveBookmarkResponse {
        success: true,
        bookmark_id,
    }))
}

/// DELETE /bookmarks?manhwa_id= - Remove the caller's bookmark on a title
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<RemoveBookmarkQuery>,
) -> ApiResult<Value> {
    let manhwa_id = query.manhwa_id.ok_or_else(|| ApiError::bad_request("manhwa_id is required"))?;

    bookmarks::delete_bookmark(&state.db, &user.user_id, manhwa_id).await?;
    Ok(ApiResponse::success(json!({ "success": true })))
}
