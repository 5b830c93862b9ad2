// handlers/elevated/moderator/mod.rs - POST /moderator command dispatcher
//
// One endpoint, many commands: the body names a `command` and carries its
// parameters inline. A missing command (or `help`) returns the catalogue.

mod content;
mod reports;
mod review;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::database::roles::{self, ROLE_ADMIN};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser, JsonBody};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    AddChapter,
    UpdateManhwa,
    UpdateCover,
    GetStats,
    MonitorSite,
    GetSubmissions,
    ApproveSubmission,
    RejectSubmission,
    GetTranslatorRequests,
    ApproveTranslator,
    RejectTranslator,
    GetHistory,
    ParseChapters,
    SyncChapters,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        let command = match name {
            "help" => Command::Help,
            "add_chapter" => Command::AddChapter,
            "update_manhwa" => Command::UpdateManhwa,
            "update_cover" => Command::UpdateCover,
            "get_stats" => Command::GetStats,
            "monitor_site" => Command::MonitorSite,
            "get_submissions" => Command::GetSubmissions,
            "approve_submission" => Command::ApproveSubmission,
            "reject_submission" => Command::RejectSubmission,
            "get_translator_requests" => Command::GetTranslatorRequests,
            "approve_translator" => Command::ApproveTranslator,
            "reject_translator" => Command::RejectTranslator,
            "get_history" => Command::GetHistory,
            "parse_chapters" => Command::ParseChapters,
            "sync_chapters" => Command::SyncChapters,
            _ => return None,
        };
        Some(command)
    }
}

/// POST /moderator - Run one moderator bot command
///
/// When X-User-Id is sent, that user must hold the site `admin` role.
pub async fn post(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Response, ApiError> {
    if let Some(user) = &user {
        let role = roles::user_role(&state.db, &user.user_id).await?;
        if role.as_deref() != Some(ROLE_ADMIN) {
            warn!("Moderator command refused for {} (role {:?})", user.user_id, role);
            return Err(ApiError::forbidden("Forbidden: Admin role required"));
        }
    }
    let user_id = user.as_ref().map(|u| u.user_id.as_str());

    let name = body.get("command").and_then(Value::as_str).unwrap_or_default().to_string();
    if name.is_empty() {
        return Ok(help());
    }
    let command = Command::parse(&name).ok_or_else(|| {
        ApiError::bad_request(format!(r#"Unknown command: {}. Use "help" for list of commands"#, name))
    })?;

    info!("Moderator command {} by {}", name, user_id.unwrap_or("admin key"));

    match command {
        Command::Help => Ok(help()),
        Command::AddChapter => content::add_chapter(&state, user_id, params(body)?).await,
        Command::UpdateManhwa => content::update_manhwa(&state, user_id, params(body)?).await,
        Command::UpdateCover => content::update_cover(&state, params(body)?).await,
        Command::ParseChapters | Command::SyncChapters => Ok(content::not_supported()),
        Command::GetStats => reports::get_stats(&state).await,
        Command::MonitorSite => reports::monitor_site(&state).await,
        Command::GetHistory => reports::get_history(&state, params(body)?).await,
        Command::GetSubmissions => review::get_submissions(&state).await,
        Command::ApproveSubmission => review::approve_submission(&state, user_id, params(body)?).await,
        Command::RejectSubmission => review::reject_submission(&state, user_id, params(body)?).await,
        Command::GetTranslatorRequests => review::get_translator_requests(&state).await,
        Command::ApproveTranslator => review::approve_translator(&state, user_id, params(body)?).await,
        Command::RejectTranslator => review::reject_translator(&state, user_id, params(body)?).await,
    }
}

/// Deserialize command parameters from the request body.
fn params<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::bad_request(format!("Invalid command parameters: {}", e)))
}

fn help() -> Response {
    ApiResponse::success(json!({
        "bot": "Moderator Bot v1.0",
        "description": "Content management bot for the manhwa site",
        "commands": {
            "add_chapter": {
                "description": "Add a chapter by hand",
                "params": {
                    "manhwa_id": "Title id",
                    "chapter_number": "Chapter number",
                    "title": "Chapter title (optional)",
                    "pages": "Array of page image URLs"
                },
                "example": {
                    "command": "add_chapter",
                    "manhwa_id": 1,
                    "chapter_number": 15,
                    "title": "Chapter 15: Awakening",
                    "pages": ["url1.jpg", "url2.jpg", "url3.jpg"]
                }
            },
            "update_manhwa": {
                "description": "Update title information",
                "params": {
                    "manhwa_id": "Title id",
                    "title": "New title (optional)",
                    "description": "Description (optional)",
                    "cover_url": "Cover URL (optional)",
                    "status": "Status (ongoing/completed)",
                    "rating": "Rating (optional)",
                    "genres": "Array of genres; replaces the current set"
                }
            },
            "update_cover": {
                "description": "Replace the cover image",
                "params": { "manhwa_id": "Title id", "cover_url": "New cover URL" }
            },
            "get_stats": { "description": "Site statistics", "params": {} },
            "monitor_site": { "description": "Site health checks", "params": {} },
            "get_submissions": { "description": "Pending title submissions", "params": {} },
            "approve_submission": {
                "description": "Approve a submission and create the title",
                "params": { "submission_id": "Submission id" }
            },
            "reject_submission": {
                "description": "Reject a submission",
                "params": { "submission_id": "Submission id", "reason": "Reason (optional)" }
            },
            "get_translator_requests": { "description": "Pending translator change requests", "params": {} },
            "approve_translator": {
                "description": "Approve a translator change",
                "params": { "request_id": "Request id" }
            },
            "reject_translator": {
                "description": "Reject a translator change",
                "params": { "request_id": "Request id", "reason": "Reason (optional)" }
            },
            "get_history": {
                "description": "Change history",
                "params": {
                    "entity_type": "Entity type (optional)",
                    "entity_id": "Entity id (optional)",
                    "limit": "Maximum rows, default 50"
                }
            },
            "parse_chapters": { "description": "Not supported; use add_chapter", "params": {} },
            "sync_chapters": { "description": "Not supported; use add_chapter", "params": {} }
        }
    }))
    .into_response()
}
