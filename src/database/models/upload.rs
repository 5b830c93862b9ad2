use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-submitted title awaiting or past moderation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserUpload {
    pub id: i32,
    pub title: String,
    pub alternative_titles: String,
    pub slug: String,
    pub description: String,
    pub cover_url: String,
    pub author: String,
    pub artist: String,
    pub status: String,
    pub release_year: Option<i32>,
    pub uploaded_by: String,
    pub team_id: Option<i32>,
    pub moderation_status: String,
    pub is_approved: bool,
    pub moderation_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UploadListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub upload: UserUpload,
    pub team_name: Option<String>,
    pub team_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadDetails {
    #[serde(flatten)]
    pub listing: UploadListing,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewUpload {
    pub title: String,
    pub alternative_titles: String,
    pub slug: String,
    pub description: String,
    pub cover_url: String,
    pub author: String,
    pub artist: String,
    pub status: String,
    pub release_year: Option<i32>,
    pub uploaded_by: String,
    pub team_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ModerationStatus::Pending),
            "approved" => Some(ModerationStatus::Approved),
            "rejected" => Some(ModerationStatus::Rejected),
            _ => None,
        }
    }
}
