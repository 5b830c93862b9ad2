//! Chapter upload: multipart form in, one committed chapter with one stitched page out.
//!
//! The form is read completely before any work starts. Stitching runs on the
//! blocking pool; the chapter and its page are then written in a single
//! [`ChapterTx`](crate::database::ChapterTx), so a failure at any step leaves
//! nothing behind.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::database::{ChapterStore, DatabaseError};
use crate::stitch::{stitch_archive, StitchError, StitchLimits};

pub const FIELD_ARCHIVE: &str = "archive";
pub const FIELD_MANHWA_ID: &str = "manhwa_id";
pub const FIELD_CHAPTER_NUMBER: &str = "chapter_number";
pub const FIELD_TITLE: &str = "title";

/// The stitched chapter is always stored as page 1.
const COMPOSITE_PAGE_POSITION: i32 = 1;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error("Stitching worker failed: {0}")]
    Worker(#[from] JoinError),

    #[error("Failed to persist chapter: {0}")]
    Persistence(#[from] DatabaseError),
}

/// A fully read and validated upload form.
#[derive(Debug, Clone)]
pub struct ChapterUpload {
    pub manhwa_id: i32,
    pub chapter_number: i32,
    pub title: String,
    pub archive: Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub chapter_id: i32,
    pub images_processed: usize,
}

#[derive(Debug, Default)]
struct RawForm {
    archive: Option<Bytes>,
    manhwa_id: Option<String>,
    chapter_number: Option<String>,
    title: Option<String>,
}

impl ChapterUpload {
    /// Drain the multipart stream. Unknown fields are skipped; a repeated
    /// field keeps its last value.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, UploadError> {
        let mut raw = RawForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_ARCHIVE => raw.archive = Some(field.bytes().await?),
                FIELD_MANHWA_ID => raw.manhwa_id = Some(field.text().await?),
                FIELD_CHAPTER_NUMBER => raw.chapter_number = Some(field.text().await?),
                FIELD_TITLE => raw.title = Some(field.text().await?),
                _ => {
                    field.bytes().await?;
                }
            }
        }

        raw.validate()
    }
}

impl RawForm {
    fn validate(self) -> Result<ChapterUpload, UploadError> {
        let archive = self
            .archive
            .filter(|bytes| !bytes.is_empty())
            .ok_or(UploadError::MissingField(FIELD_ARCHIVE))?;
        let manhwa_id = parse_required(FIELD_MANHWA_ID, self.manhwa_id)?;
        let chapter_number = parse_required(FIELD_CHAPTER_NUMBER, self.chapter_number)?;
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();

        Ok(ChapterUpload {
            manhwa_id,
            chapter_number,
            title,
            archive,
        })
    }
}

fn parse_required(field: &'static str, value: Option<String>) -> Result<i32, UploadError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(UploadError::MissingField(field))?;
    value.parse().map_err(|_| UploadError::InvalidField { field, value })
}

/// Stitch the archive and persist the chapter with its single composite page.
///
/// Not idempotent: every call that succeeds creates a new chapter row.
pub async fn process_upload(
    store: &dyn ChapterStore,
    limits: StitchLimits,
    upload: ChapterUpload,
) -> Result<UploadOutcome, UploadError> {
    let ChapterUpload {
        manhwa_id,
        chapter_number,
        title,
        archive,
    } = upload;

    let stitched = match tokio::task::spawn_blocking(move || stitch_archive(&archive, &limits)).await? {
        Ok(stitched) => stitched,
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected chapter {} upload for manhwa {}: {}", chapter_number, manhwa_id, e);
            }
            return Err(e.into());
        }
    };

    let mut tx = store.begin().await?;
    let chapter_id = tx.create_chapter(manhwa_id, chapter_number, &title).await?;
    tx.add_page(chapter_id, COMPOSITE_PAGE_POSITION, &stitched.data_url).await?;
    tx.commit().await?;

    info!(
        "Saved chapter {} (#{}) for manhwa {}: {} images, {}x{}",
        chapter_id, chapter_number, manhwa_id, stitched.images_processed, stitched.width, stitched.height
    );

    Ok(UploadOutcome {
        success: true,
        chapter_id,
        images_processed: stitched.images_processed,
    })
}
