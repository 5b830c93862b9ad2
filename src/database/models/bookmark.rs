use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i32,
    pub manhwa_id: i32,
    pub manhwa_title: String,
    pub cover: String,
    pub rating: f64,
    pub chapter_id: Option<i32>,
    pub chapter_number: Option<i32>,
    pub chapter_title: Option<String>,
    pub created_at: DateTime<Utc>,
}
