use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog card: one title with its chapter count and genre names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManhwaSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub rating: f64,
    pub status: String,
    pub views: i32,
    pub chapters: i64,
    pub genre: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManhwaHeader {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub rating: f64,
    pub status: String,
    pub views: i32,
    pub genre: Vec<String>,
}

/// Title page: header plus chapter list, and the pages of one chapter when asked.
#[derive(Debug, Clone, Serialize)]
pub struct ManhwaDetails {
    #[serde(flatten)]
    pub header: ManhwaHeader,
    pub chapters: Vec<ChapterRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChapterRef {
    pub id: i32,
    pub number: i32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PageRef {
    pub id: i32,
    pub number: i32,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Minimal `(id, title)` pair used in moderation responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManhwaRef {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopManhwa {
    pub id: i32,
    pub title: String,
    pub views: i32,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentChapter {
    pub title: String,
    pub chapter_number: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChapterWithoutPages {
    pub id: i32,
    pub chapter_number: i32,
    pub title: String,
}
