use thiserror::Error;

/// Failures raised while turning an uploaded archive into a composite page.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("No images found in archive")]
    NoImagesFound,

    #[error("Unsupported image format in '{name}': {source}")]
    UnsupportedImageFormat {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Upload limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Cannot compose an empty batch")]
    EmptyBatch,

    #[error("Failed to encode composite: {0}")]
    Encode(#[source] image::ImageError),
}

impl StitchError {
    pub fn limit(message: impl Into<String>) -> Self {
        StitchError::LimitExceeded(message.into())
    }

    /// True when the failure was caused by what the client sent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StitchError::InvalidArchive(_) | StitchError::NoImagesFound | StitchError::LimitExceeded(_)
        )
    }
}
