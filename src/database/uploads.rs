use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{ModerationStatus, NewUpload, UploadDetails, UploadListing, UserUpload};
use crate::database::query_builder::{Column, UpdateBuilder};

/// Columns the uploader may change.
pub const UPLOAD_COLUMNS: [Column; 8] = [
    Column::text("title"),
    Column::text("alternative_titles"),
    Column::text("description"),
    Column::text("cover_url"),
    Column::text("author"),
    Column::text("artist"),
    Column::text("status"),
    Column::integer("release_year"),
];

const UPLOAD_RETURNING: &str = " RETURNING id, title, alternative_titles, slug, description, cover_url, author, artist,
    status, release_year, uploaded_by, team_id, moderation_status, is_approved, moderation_notes,
    created_at, updated_at";

const LISTING_SQL: &str = "
    SELECT uu.id, uu.title, uu.alternative_titles, uu.slug, uu.description, uu.cover_url, uu.author,
           uu.artist, uu.status, uu.release_year, uu.uploaded_by, uu.team_id, uu.moderation_status,
           uu.is_approved, uu.moderation_notes, uu.created_at, uu.updated_at,
           t.name AS team_name, t.slug AS team_slug
    FROM user_uploads uu
    LEFT JOIN teams t ON t.id = uu.team_id";

pub async fn find_upload(pool: &PgPool, upload_id: i32) -> Result<Option<UploadDetails>, DatabaseError> {
    let listing = sqlx::query_as::<_, UploadListing>(&format!("{LISTING_SQL} WHERE uu.id = $1"))
        .bind(upload_id)
        .fetch_optional(pool)
        .await?;

    let Some(listing) = listing else {
        return Ok(None);
    };

    let genres = sqlx::query_scalar::<_, String>(
        "SELECT g.name
         FROM user_upload_genres uug
         JOIN genres g ON g.id = uug.genre_id
         WHERE uug.upload_id = $1
         ORDER BY g.name",
    )
    .bind(upload_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(UploadDetails { listing, genres }))
}

/// Uploads filtered by uploader and moderation status, newest first.
pub async fn list_uploads(
    pool: &PgPool,
    uploaded_by: Option<&str>,
    status: Option<ModerationStatus>,
) -> Result<Vec<UploadListing>, DatabaseError> {
    let uploads = sqlx::query_as::<_, UploadListing>(&format!(
        "{LISTING_SQL}
         WHERE ($1::text IS NULL OR uu.uploaded_by = $1)
           AND ($2::text IS NULL OR uu.moderation_status = $2)
         ORDER BY uu.created_at DESC, uu.id DESC"
    ))
    .bind(uploaded_by)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(uploads)
}

/// Insert an upload and link its genres in one transaction.
pub async fn create_upload(pool: &PgPool, new: &NewUpload) -> Result<UserUpload, DatabaseError> {
    let mut tx = pool.begin().await?;

    let upload = sqlx::query_as::<_, UserUpload>(&format!(
        "INSERT INTO user_uploads (
             title, alternative_titles, slug, description, cover_url,
             author, artist, status, release_year, uploaded_by, team_id
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11){UPLOAD_RETURNING}"
    ))
    .bind(&new.title)
    .bind(&new.alternative_titles)
    .bind(&new.slug)
    .bind(&new.description)
    .bind(&new.cover_url)
    .bind(&new.author)
    .bind(&new.artist)
    .bind(&new.status)
    .bind(new.release_year)
    .bind(&new.uploaded_by)
    .bind(new.team_id)
    .fetch_one(&mut *tx)
    .await?;

    if !new.genre_ids.is_empty() {
        sqlx::query(
            "INSERT INTO user_upload_genres (upload_id, genre_id)
             SELECT $1, g FROM UNNEST($2::int[]) AS g
             ON CONFLICT DO NOTHING",
        )
        .bind(upload.id)
        .bind(&new.genre_ids)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(upload)
}

pub async fn upload_owner(pool: &PgPool, upload_id: i32) -> Result<Option<String>, DatabaseError> {
    let owner = sqlx::query_scalar::<_, String>("SELECT uploaded_by FROM user_uploads WHERE id = $1")
        .bind(upload_id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

pub async fn moderate_upload(
    pool: &PgPool,
    upload_id: i32,
    status: ModerationStatus,
    notes: &str,
) -> Result<UserUpload, DatabaseError> {
    let upload = sqlx::query_as::<_, UserUpload>(&format!(
        "UPDATE user_uploads
         SET moderation_status = $1, is_approved = $2, moderation_notes = $3, updated_at = CURRENT_TIMESTAMP
         WHERE id = $4{UPLOAD_RETURNING}"
    ))
    .bind(status.as_str())
    .bind(status == ModerationStatus::Approved)
    .bind(notes)
    .bind(upload_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Upload not found".to_string()))?;
    Ok(upload)
}

/// Apply whitelisted fields from `body`. `Ok(None)` when nothing to update.
pub async fn update_upload(
    pool: &PgPool,
    upload_id: i32,
    body: &Map<String, Value>,
) -> Result<Option<UserUpload>, DatabaseError> {
    let update = UpdateBuilder::new("user_uploads").set_present(&UPLOAD_COLUMNS, body)?;
    if update.is_empty() {
        return Ok(None);
    }

    let mut qb = update.touch_updated_at().build(upload_id);
    qb.push(UPLOAD_RETURNING);
    let upload = qb
        .build_query_as::<UserUpload>()
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Upload not found".to_string()))?;
    Ok(Some(upload))
}
