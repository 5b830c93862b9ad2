use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Bookmark;

/// Bookmarks of one user, newest first.
pub async fn list_bookmarks(pool: &PgPool, user_id: &str) -> Result<Vec<Bookmark>, DatabaseError> {
    let bookmarks = sqlx::query_as::<_, Bookmark>(
        "SELECT b.id, b.manhwa_id, m.title AS manhwa_title, m.cover_url AS cover,
                COALESCE(m.rating, 0)::float8 AS rating,
                b.chapter_id, c.chapter_number, c.title AS chapter_title, b.created_at
         FROM bookmarks b
         JOIN manhwa m ON m.id = b.manhwa_id
         LEFT JOIN chapters c ON c.id = b.chapter_id
         WHERE b.user_id = $1
         ORDER BY b.created_at DESC, b.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(bookmarks)
}

/// One bookmark per `(user, title)`; a second save moves it to the new chapter.
pub async fn upsert_bookmark(
    pool: &PgPool,
    user_id: &str,
    manhwa_id: i32,
    chapter_id: Option<i32>,
) -> Result<i32, DatabaseError> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO bookmarks (user_id, manhwa_id, chapter_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, manhwa_id) DO UPDATE SET chapter_id = EXCLUDED.chapter_id
         RETURNING id",
    )
    .bind(user_id)
    .bind(manhwa_id)
    .bind(chapter_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn delete_bookmark(pool: &PgPool, user_id: &str, manhwa_id: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND manhwa_id = $2")
        .bind(user_id)
        .bind(manhwa_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
