// handlers/protected/comments.rs - POST/PUT/DELETE /comments handlers

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::comments;
use crate::database::models::{Comment, NewComment};
use crate::database::roles;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, QueryParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub manhwa_id: Option<i32>,
    #[serde(default)]
    pub text: String,
    pub chapter_id: Option<i32>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub is_spoiler: bool,
    pub reply_to: Option<i32>,
    pub username: Option<String>,
    /// Used only when the X-User-Id header is absent.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCommentResponse {
    pub comment: Comment,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CommentIdQuery {
    pub id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /comments - Post a comment or a reply
///
/// The author comes from X-User-Id, falling back to `user_id` in the body.
pub async fn create(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    JsonBody(body): JsonBody<CreateCommentRequest>,
) -> ApiResult<CreateCommentResponse> {
    let user_id = user
        .map(|u| u.user_id)
        .or_else(|| body.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty()).map(str::to_string))
        .ok_or_else(|| ApiError::unauthorized("User ID required"))?;

    let text = body.text.trim();
    let manhwa_id = match body.manhwa_id {
        Some(id) if !text.is_empty() => id,
        _ => return Err(ApiError::bad_request("manhwa_id and text required")),
    };

    let username = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_username(&user_id));

    let new = NewComment {
        manhwa_id,
        chapter_id: body.chapter_id,
        user_id,
        username,
        text: text.to_string(),
        rating: body.rating,
        is_spoiler: body.is_spoiler,
        reply_to: body.reply_to,
    };

    let comment = comments::insert_comment(&state.db, &new).await?;
    Ok(ApiResponse::created(CreateCommentResponse {
        comment,
        message: "Comment created",
    }))
}

/// PUT /comments?id= - Edit the caller's own comment
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<CommentIdQuery>,
    JsonBody(body): JsonBody<EditCommentRequest>,
) -> ApiResult<MessageResponse> {
    let comment_id = query.id.ok_or_else(|| ApiError::bad_request("comment id required"))?;
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("text required"));
    }

    if !comments::update_comment_text(&state.db, comment_id, &user.user_id, text).await? {
        return Err(ApiError::not_found("Comment not found"));
    }
    Ok(ApiResponse::success(MessageResponse {
        message: "Comment updated",
    }))
}

/// DELETE /comments?id= - Soft delete by the author, a moderator or an admin
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<CommentIdQuery>,
) -> ApiResult<MessageResponse> {
    let comment_id = query.id.ok_or_else(|| ApiError::bad_request("comment id required"))?;

    let owner = comments::comment_owner(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if owner != user.user_id && !roles::is_staff(&state.db, &user.user_id).await? {
        return Err(ApiError::forbidden("Only the author or a moderator can delete this comment"));
    }

    comments::soft_delete_comment(&state.db, comment_id).await?;
    tracing::info!("Comment {} deleted by {}", comment_id, user.user_id);
    Ok(ApiResponse::success(MessageResponse {
        message: "Comment deleted",
    }))
}

/// `User_` followed by the first 8 characters of the id.
fn default_username(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(8).collect();
    format!("User_{}", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_username_uses_id_prefix() {
        assert_eq!(default_username("a1b2c3d4e5f6"), "User_a1b2c3d4");
        assert_eq!(default_username("42"), "User_42");
        assert_eq!(default_username("пользователь"), "User_пользова");
    }
}
