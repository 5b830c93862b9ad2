// handlers/public/system.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};
use tracing::warn;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET / - Service information
pub async fn root() -> ApiResponse<Value> {
    let version = env!("CARGO_PKG_VERSION");

    ApiResponse::success(json!({
        "success": true,
        "data": {
            "name": "Manhwa API",
            "version": version,
            "description": "Catalog, community and chapter upload backend for a manhwa reading site",
            "endpoints": {
                "catalog": "/manhwa, /manhwa/:id, /genres (public)",
                "comments": "/comments (read public, write X-User-Id)",
                "bookmarks": "/bookmarks (X-User-Id)",
                "teams": "/teams (read public, write X-User-Id)",
                "uploads": "/uploads (read public, write X-User-Id)",
                "upload_chapter": "/upload-chapter (multipart: archive, manhwa_id, chapter_number, title)",
                "admin": "/admin (X-Admin-Key)",
                "moderator": "/moderator (X-Admin-Key)",
            }
        }
    }))
}

/// GET /health - Database connectivity check
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    DatabaseManager::health_check(&state.db).await.map_err(|e| {
        warn!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    })))
}
