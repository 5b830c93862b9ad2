use std::collections::HashMap;

use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, CommentThread, NewComment};

pub const DELETED_TEXT: &str = "[удалено]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    #[default]
    New,
    Popular,
    Rating,
}

impl CommentSort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("popular") => CommentSort::Popular,
            Some("rating") => CommentSort::Rating,
            _ => CommentSort::New,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            CommentSort::New => "c.created_at DESC, c.id DESC",
            CommentSort::Popular => "likes DESC, c.created_at DESC, c.id DESC",
            CommentSort::Rating => "c.rating DESC NULLS LAST, c.created_at DESC, c.id DESC",
        }
    }
}

const COMMENT_COLUMNS: &str = "c.id, c.manhwa_id, c.chapter_id, c.user_id, c.username, c.text, c.rating,
    c.is_spoiler, c.reply_to, c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS likes";

/// Top-level comments of a title (or of one chapter) with their replies.
///
/// Without `chapter_id` only title-level comments are returned.
pub async fn list_threads(
    pool: &PgPool,
    manhwa_id: i32,
    chapter_id: Option<i32>,
    sort: CommentSort,
) -> Result<Vec<CommentThread>, DatabaseError> {
    let sql = format!(
        "SELECT {COMMENT_COLUMNS}
         FROM comments c
         WHERE c.manhwa_id = $1
           AND c.chapter_id IS NOT DISTINCT FROM $2
           AND c.reply_to IS NULL
         ORDER BY {}",
        sort.order_by()
    );
    let top = sqlx::query_as::<_, Comment>(&sql)
        .bind(manhwa_id)
        .bind(chapter_id)
        .fetch_all(pool)
        .await?;

    if top.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = top.iter().map(|c| c.id).collect();
    let replies = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS}
         FROM comments c
         WHERE c.reply_to = ANY($1)
         ORDER BY c.created_at ASC, c.id ASC"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_parent: HashMap<i32, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent) = reply.reply_to {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    Ok(top
        .into_iter()
        .map(|comment| {
            let replies = by_parent.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect())
}

pub async fn insert_comment(pool: &PgPool, new: &NewComment) -> Result<Comment, DatabaseError> {
    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (manhwa_id, chapter_id, user_id, username, text, rating, is_spoiler, reply_to)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, manhwa_id, chapter_id, user_id, username, text, rating, is_spoiler, reply_to,
                   created_at, updated_at, 0::bigint AS likes",
    )
    .bind(new.manhwa_id)
    .bind(new.chapter_id)
    .bind(&new.user_id)
    .bind(&new.username)
    .bind(&new.text)
    .bind(new.rating)
    .bind(new.is_spoiler)
    .bind(new.reply_to)
    .fetch_one(pool)
    .await?;
    Ok(comment)
}

pub async fn comment_owner(pool: &PgPool, comment_id: i32) -> Result<Option<String>, DatabaseError> {
    let owner = sqlx::query_scalar::<_, String>("SELECT user_id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

/// Edit a comment owned by `user_id`. Returns false when no such comment exists.
pub async fn update_comment_text(pool: &PgPool, comment_id: i32, user_id: &str, text: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE comments SET text = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND user_id = $3",
    )
    .bind(text)
    .bind(comment_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Soft delete: the row stays so reply threads keep their parent.
pub async fn soft_delete_comment(pool: &PgPool, comment_id: i32) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE comments SET text = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(DELETED_TEXT)
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
