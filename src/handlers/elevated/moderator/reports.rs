use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::database::models::HistoryEntry;
use crate::database::{moderation, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SiteHealth {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub checks: Vec<HealthCheck>,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
    pub total: usize,
}

pub async fn get_stats(state: &AppState) -> Result<Response, ApiError> {
    let stats = moderation::site_stats(&state.db).await?;
    Ok(ApiResponse::success(stats).into_response())
}

/// Database reachability plus two content checks. Only a failed database
/// check makes the site `unhealthy`; content findings are warnings.
pub async fn monitor_site(state: &AppState) -> Result<Response, ApiError> {
    let mut health = SiteHealth {
        status: "healthy",
        timestamp: Utc::now(),
        checks: Vec::new(),
    };

    if let Err(e) = DatabaseManager::health_check(&state.db).await {
        warn!("Site monitor: database check failed: {}", e);
        health.status = "unhealthy";
        health.checks.push(HealthCheck {
            name: "database",
            status: "error",
            message: e.to_string(),
            details: None,
        });
        return Ok(ApiResponse::success(health).into_response());
    }

    health.checks.push(HealthCheck {
        name: "database",
        status: "ok",
        message: "Database connection successful".to_string(),
        details: None,
    });

    let empty_titles = moderation::manhwa_without_chapters(&state.db).await?;
    health.checks.push(content_check(
        "content_check",
        &empty_titles,
        "manhwa without chapters",
        "All manhwa have chapters",
    ));

    let empty_chapters = moderation::chapters_without_pages(&state.db).await?;
    health.checks.push(content_check(
        "pages_check",
        &empty_chapters,
        "chapters without pages",
        "All chapters have pages",
    ));

    Ok(ApiResponse::success(health).into_response())
}

fn content_check<T: Serialize>(name: &'static str, findings: &[T], what: &str, all_clear: &str) -> HealthCheck {
    if findings.is_empty() {
        return HealthCheck {
            name,
            status: "ok",
            message: all_clear.to_string(),
            details: None,
        };
    }

    HealthCheck {
        name,
        status: "warning",
        message: format!("{} {}", findings.len(), what),
        details: serde_json::to_value(findings).ok(),
    }
}

pub async fn get_history(state: &AppState, params: HistoryParams) -> Result<Response, ApiError> {
    let entity = params.entity_type.as_deref().zip(params.entity_id);
    let limit = state.config.list_limit(params.limit);

    let history = moderation::change_history(&state.db, entity, limit).await?;
    let total = history.len();
    Ok(ApiResponse::success(HistoryResponse { history, total }).into_response())
}
