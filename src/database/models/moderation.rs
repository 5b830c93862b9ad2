use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i32,
    pub title: String,
    pub alternative_titles: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub submitted_by: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub manhwa_id: Option<i32>,
    pub moderator_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub moderated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TranslatorRequest {
    pub id: i32,
    pub manhwa_id: i32,
    pub team_id: Option<i32>,
    pub reason: Option<String>,
    pub submitted_by: Option<String>,
    pub status: String,
    pub moderator_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub moderated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TranslatorRequestListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: TranslatorRequest,
    pub manhwa_title: String,
}

/// One audit row in `change_history`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub action: String,
    pub user_id: String,
    pub changes: String,
    pub created_at: DateTime<Utc>,
}
