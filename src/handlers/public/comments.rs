// handlers/public/comments.rs - GET /comments handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::comments::{self, CommentSort};
use crate::database::models::CommentThread;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, QueryParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub manhwa_id: Option<i32>,
    pub chapter_id: Option<i32>,
    /// `new` (default), `popular` or `rating`.
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentThread>,
    pub total: usize,
}

/// GET /comments - Top-level comments of a title or chapter, each with its replies
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<CommentsQuery>) -> ApiResult<CommentsResponse> {
    let manhwa_id = query.manhwa_id.ok_or_else(|| ApiError::bad_request("manhwa_id required"))?;
    let sort = CommentSort::from_param(query.sort.as_deref());

    let comments = comments::list_threads(&state.db, manhwa_id, query.chapter_id, sort).await?;
    let total = comments.len();
    Ok(ApiResponse::success(CommentsResponse { comments, total }))
}
