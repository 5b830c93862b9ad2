use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub manhwa_id: i32,
    pub chapter_id: Option<i32>,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub rating: Option<i32>,
    pub is_spoiler: bool,
    pub reply_to: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub likes: i64,
}

/// A top-level comment with its replies, oldest reply first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Fields of a new comment after validation.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub manhwa_id: i32,
    pub chapter_id: Option<i32>,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub rating: Option<i32>,
    pub is_spoiler: bool,
    pub reply_to: Option<i32>,
}
