// handlers/public/chapters.rs - POST /upload-chapter handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::stitch::StitchLimits;
use crate::upload::{self, ChapterUpload, UploadOutcome};
use crate::AppState;

/// POST /upload-chapter - Stitch a zip of pages into one chapter page
///
/// Multipart fields: `archive` (zip), `manhwa_id`, `chapter_number`, and an
/// optional `title`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadOutcome> {
    let mut multipart = multipart?;
    let form = ChapterUpload::from_multipart(&mut multipart).await?;
    let limits = StitchLimits::from(&state.config.upload);

    let outcome = upload::process_upload(state.chapters.as_ref(), limits, form).await?;
    Ok(ApiResponse::success(outcome))
}
