use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{ChapterRef, Genre, ManhwaDetails, ManhwaHeader, ManhwaRef, ManhwaSummary, PageRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogSort {
    Rating,
    #[default]
    Views,
    New,
}

impl CatalogSort {
    /// Lenient parse; anything unrecognised falls back to views.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("rating") => CatalogSort::Rating,
            Some("new") => CatalogSort::New,
            _ => CatalogSort::Views,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            CatalogSort::Rating => "m.rating DESC NULLS LAST, m.id",
            CatalogSort::Views => "m.views DESC, m.id",
            CatalogSort::New => "m.created_at DESC, m.id",
        }
    }
}

const SUMMARY_COLUMNS: &str = "
    m.id, m.title, m.description, m.cover_url AS cover,
    COALESCE(m.rating, 0)::float8 AS rating, m.status, m.views,
    COUNT(DISTINCT c.id) AS chapters,
    COALESCE(ARRAY_AGG(DISTINCT mg.genre) FILTER (WHERE mg.genre IS NOT NULL), '{}') AS genre";

pub async fn list_manhwa(
    pool: &PgPool,
    search: Option<&str>,
    sort: CatalogSort,
    limit: i64,
) -> Result<Vec<ManhwaSummary>, DatabaseError> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS}
         FROM manhwa m
         LEFT JOIN chapters c ON c.manhwa_id = m.id
         LEFT JOIN manhwa_genres mg ON mg.manhwa_id = m.id
         WHERE ($1::text IS NULL OR m.title ILIKE '%' || $1 || '%')
         GROUP BY m.id
         ORDER BY {}
         LIMIT $2",
        sort.order_by()
    );

    let rows = sqlx::query_as::<_, ManhwaSummary>(&sql)
        .bind(search.filter(|s| !s.is_empty()))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_genres(pool: &PgPool) -> Result<Vec<Genre>, DatabaseError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(genres)
}

pub async fn manhwa_details(
    pool: &PgPool,
    manhwa_id: i32,
    chapter_id: Option<i32>,
) -> Result<ManhwaDetails, DatabaseError> {
    let header = sqlx::query_as::<_, ManhwaHeader>(
        "SELECT m.id, m.title, m.description, m.cover_url AS cover,
                COALESCE(m.rating, 0)::float8 AS rating, m.status, m.views,
                COALESCE(ARRAY_AGG(DISTINCT mg.genre) FILTER (WHERE mg.genre IS NOT NULL), '{}') AS genre
         FROM manhwa m
         LEFT JOIN manhwa_genres mg ON mg.manhwa_id = m.id
         WHERE m.id = $1
         GROUP BY m.id",
    )
    .bind(manhwa_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Manhwa not found".to_string()))?;

    let chapters = sqlx::query_as::<_, ChapterRef>(
        "SELECT id, chapter_number AS number, title
         FROM chapters
         WHERE manhwa_id = $1
         ORDER BY chapter_number, id",
    )
    .bind(manhwa_id)
    .fetch_all(pool)
    .await?;

    let pages = match chapter_id {
        Some(chapter_id) => Some(
            sqlx::query_as::<_, PageRef>(
                "SELECT id, page_number AS number, image_url AS url
                 FROM pages
                 WHERE chapter_id = $1
                 ORDER BY page_number, id",
            )
            .bind(chapter_id)
            .fetch_all(pool)
            .await?,
        ),
        None => None,
    };

    Ok(ManhwaDetails { header, chapters, pages })
}

/// `(id, title)` of one title, locking the row inside a transaction.
pub async fn find_title_for_update(
    conn: &mut PgConnection,
    manhwa_id: i32,
) -> Result<Option<ManhwaRef>, DatabaseError> {
    let row = sqlx::query_as::<_, ManhwaRef>(
        "SELECT id, title FROM manhwa WHERE id = $1 FOR UPDATE",
    )
    .bind(manhwa_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn insert_manhwa(
    conn: &mut PgConnection,
    title: &str,
    description: &str,
    cover_url: &str,
) -> Result<i32, DatabaseError> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO manhwa (title, description, cover_url) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(title)
    .bind(description)
    .bind(cover_url)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Replace the genre set of a title.
pub async fn replace_genres(conn: &mut PgConnection, manhwa_id: i32, genres: &[String]) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM manhwa_genres WHERE manhwa_id = $1")
        .bind(manhwa_id)
        .execute(&mut *conn)
        .await?;
    add_genres(conn, manhwa_id, genres).await
}

pub async fn add_genres(conn: &mut PgConnection, manhwa_id: i32, genres: &[String]) -> Result<(), DatabaseError> {
    if genres.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO manhwa_genres (manhwa_id, genre)
         SELECT $1, g FROM UNNEST($2::text[]) AS g
         ON CONFLICT DO NOTHING",
    )
    .bind(manhwa_id)
    .bind(genres)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert a chapter and its pages (numbered from 1); returns the chapter id.
pub async fn insert_chapter_with_pages(
    conn: &mut PgConnection,
    manhwa_id: i32,
    chapter_number: i32,
    title: &str,
    pages: &[String],
) -> Result<i32, DatabaseError> {
    let chapter_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO chapters (manhwa_id, chapter_number, title) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(manhwa_id)
    .bind(chapter_number)
    .bind(title)
    .fetch_one(&mut *conn)
    .await?;

    if !pages.is_empty() {
        sqlx::query(
            "INSERT INTO pages (chapter_id, page_number, image_url)
             SELECT $1, p.ord::int, p.url FROM UNNEST($2::text[]) WITH ORDINALITY AS p(url, ord)",
        )
        .bind(chapter_id)
        .bind(pages)
        .execute(conn)
        .await?;
    }

    Ok(chapter_id)
}

pub async fn chapter_exists(conn: &mut PgConnection, manhwa_id: i32, chapter_number: i32) -> Result<bool, DatabaseError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM chapters WHERE manhwa_id = $1 AND chapter_number = $2)",
    )
    .bind(manhwa_id)
    .bind(chapter_number)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}
