use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ChapterWithoutPages, HistoryEntry, ManhwaRef, RecentChapter, Submission, TopManhwa, TranslatorRequest,
    TranslatorRequestListing,
};
use crate::database::query_builder::{Column, UpdateBuilder};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Actor recorded in the audit log when no user id is known.
pub const SYSTEM_ACTOR: &str = "system";

/// Catalog columns a moderator may change.
pub const MANHWA_COLUMNS: [Column; 5] = [
    Column::text("title"),
    Column::text("description"),
    Column::text("cover_url"),
    Column::text("status"),
    Column::numeric("rating"),
];

pub async fn log_change(
    conn: &mut PgConnection,
    entity_type: &str,
    entity_id: i32,
    action: &str,
    user_id: Option<&str>,
    changes: &str,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO change_history (entity_type, entity_id, action, user_id, changes)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(user_id.unwrap_or(SYSTEM_ACTOR))
    .bind(changes)
    .execute(conn)
    .await?;
    Ok(())
}

/// Queue a `new_chapter` notification for every subscriber of the title.
pub async fn notify_new_chapter(
    conn: &mut PgConnection,
    manhwa: &ManhwaRef,
    chapter_id: i32,
    chapter_number: i32,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO notifications (user_id, type, title, message, link)
         SELECT ns.user_id, 'new_chapter', $1, $2, $3
         FROM notifications_subscriptions ns
         WHERE ns.manhwa_id = $4 AND ns.notify_new_chapters = TRUE",
    )
    .bind(format!("Новая глава {}", chapter_number))
    .bind(format!("{} - Глава {}", manhwa.title, chapter_number))
    .bind(format!("/reader/{}?chapter={}", manhwa.id, chapter_id))
    .bind(manhwa.id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Apply whitelisted catalog fields; returns the columns written.
pub async fn update_manhwa_fields(
    conn: &mut PgConnection,
    manhwa_id: i32,
    body: &Map<String, Value>,
) -> Result<Vec<&'static str>, DatabaseError> {
    let update = UpdateBuilder::new("manhwa").set_present(&MANHWA_COLUMNS, body)?;
    if update.is_empty() {
        return Ok(Vec::new());
    }
    let columns = update.columns();
    let mut qb = update.build(manhwa_id);
    let result = qb.build().execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Manhwa not found".to_string()));
    }
    Ok(columns)
}

pub async fn update_cover(pool: &PgPool, manhwa_id: i32, cover_url: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE manhwa SET cover_url = $1 WHERE id = $2")
        .bind(cover_url)
        .bind(manhwa_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Manhwa not found".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub total_manhwa: i64,
    pub total_chapters: i64,
    pub total_pages: i64,
    pub total_comments: i64,
    pub top_manhwa: Vec<TopManhwa>,
    pub recent_chapters: Vec<RecentChapter>,
}

pub async fn site_stats(pool: &PgPool) -> Result<SiteStats, DatabaseError> {
    let (total_manhwa, total_chapters, total_pages, total_comments) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM manhwa),
                    (SELECT COUNT(*) FROM chapters),
                    (SELECT COUNT(*) FROM pages),
                    (SELECT COUNT(*) FROM comments)",
        )
        .fetch_one(pool)
        .await?;

    let top_manhwa = sqlx::query_as::<_, TopManhwa>(
        "SELECT id, title, views, COALESCE(rating, 0)::float8 AS rating
         FROM manhwa ORDER BY views DESC, id LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    let recent_chapters = sqlx::query_as::<_, RecentChapter>(
        "SELECT m.title, c.chapter_number, c.created_at
         FROM chapters c
         JOIN manhwa m ON m.id = c.manhwa_id
         ORDER BY c.created_at DESC, c.id DESC
         LIMIT 10",
    )
    .fetch_all(pool)
    .await?;

    Ok(SiteStats {
        total_manhwa,
        total_chapters,
        total_pages,
        total_comments,
        top_manhwa,
        recent_chapters,
    })
}

pub async fn manhwa_without_chapters(pool: &PgPool) -> Result<Vec<ManhwaRef>, DatabaseError> {
    let rows = sqlx::query_as::<_, ManhwaRef>(
        "SELECT m.id, m.title
         FROM manhwa m
         WHERE NOT EXISTS (SELECT 1 FROM chapters c WHERE c.manhwa_id = m.id)
         ORDER BY m.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn chapters_without_pages(pool: &PgPool) -> Result<Vec<ChapterWithoutPages>, DatabaseError> {
    let rows = sqlx::query_as::<_, ChapterWithoutPages>(
        "SELECT c.id, c.chapter_number, m.title
         FROM chapters c
         JOIN manhwa m ON m.id = c.manhwa_id
         WHERE NOT EXISTS (SELECT 1 FROM pages p WHERE p.chapter_id = c.id)
         ORDER BY c.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn pending_submissions(pool: &PgPool) -> Result<Vec<Submission>, DatabaseError> {
    let rows = sqlx::query_as::<_, Submission>(
        "SELECT * FROM manhwa_submissions WHERE status = $1 ORDER BY submitted_at DESC, id DESC",
    )
    .bind(STATUS_PENDING)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_submission_for_update(
    conn: &mut PgConnection,
    submission_id: i32,
) -> Result<Option<Submission>, DatabaseError> {
    let row = sqlx::query_as::<_, Submission>("SELECT * FROM manhwa_submissions WHERE id = $1 FOR UPDATE")
        .bind(submission_id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// True when the title, or any comma-separated alternative title, already
/// names a catalog entry (case-insensitive).
pub async fn title_exists(
    conn: &mut PgConnection,
    title: &str,
    alternative_titles: Option<&str>,
) -> Result<bool, DatabaseError> {
    let candidates = candidate_titles(title, alternative_titles);
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM manhwa WHERE LOWER(title) = ANY($1))",
    )
    .bind(&candidates)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

fn candidate_titles(title: &str, alternative_titles: Option<&str>) -> Vec<String> {
    std::iter::once(title)
        .chain(alternative_titles.unwrap_or_default().split(','))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub async fn approve_submission(
    conn: &mut PgConnection,
    submission_id: i32,
    manhwa_id: i32,
    moderator_id: Option<&str>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE manhwa_submissions
         SET status = $1, manhwa_id = $2, moderator_id = $3, moderated_at = CURRENT_TIMESTAMP
         WHERE id = $4",
    )
    .bind(STATUS_APPROVED)
    .bind(manhwa_id)
    .bind(moderator_id)
    .bind(submission_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Reject a pending submission. Returns false if it was not pending.
pub async fn reject_submission(
    conn: &mut PgConnection,
    submission_id: i32,
    reason: &str,
    moderator_id: Option<&str>,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE manhwa_submissions
         SET status = $1, rejection_reason = $2, moderator_id = $3, moderated_at = CURRENT_TIMESTAMP
         WHERE id = $4 AND status = $5",
    )
    .bind(STATUS_REJECTED)
    .bind(reason)
    .bind(moderator_id)
    .bind(submission_id)
    .bind(STATUS_PENDING)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn pending_translator_requests(pool: &PgPool) -> Result<Vec<TranslatorRequestListing>, DatabaseError> {
    let rows = sqlx::query_as::<_, TranslatorRequestListing>(
        "SELECT tr.id, tr.manhwa_id, tr.team_id, tr.reason, tr.submitted_by, tr.status,
                tr.moderator_id, tr.submitted_at, tr.moderated_at, m.title AS manhwa_title
         FROM translator_change_requests tr
         JOIN manhwa m ON m.id = tr.manhwa_id
         WHERE tr.status = $1
         ORDER BY tr.submitted_at DESC, tr.id DESC",
    )
    .bind(STATUS_PENDING)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_translator_request_for_update(
    conn: &mut PgConnection,
    request_id: i32,
) -> Result<Option<TranslatorRequest>, DatabaseError> {
    let row = sqlx::query_as::<_, TranslatorRequest>(
        "SELECT * FROM translator_change_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Move a pending translator request to `status`. Returns false if it was not pending.
pub async fn resolve_translator_request(
    conn: &mut PgConnection,
    request_id: i32,
    status: &str,
    moderator_id: Option<&str>,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE translator_change_requests
         SET status = $1, moderator_id = $2, moderated_at = CURRENT_TIMESTAMP
         WHERE id = $3 AND status = $4",
    )
    .bind(status)
    .bind(moderator_id)
    .bind(request_id)
    .bind(STATUS_PENDING)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn change_history(
    pool: &PgPool,
    entity: Option<(&str, i32)>,
    limit: i64,
) -> Result<Vec<HistoryEntry>, DatabaseError> {
    let (entity_type, entity_id) = entity.unzip();
    let rows = sqlx::query_as::<_, HistoryEntry>(
        "SELECT id, entity_type, entity_id, action, user_id, changes, created_at
         FROM change_history
         WHERE ($1::text IS NULL OR (entity_type = $1 AND entity_id = $2))
         ORDER BY created_at DESC, id DESC
         LIMIT $3",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
