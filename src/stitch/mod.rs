//! Chapter stitching: one zip of page images in, one tall JPEG data-URL out.
//!
//! Stages, run strictly in sequence on the calling thread:
//!
//! 1. [`archive`]: select image entries, sorted by in-archive filename
//! 2. [`normalize`]: probe header dimensions against the limits and the
//!    running canvas budget, then decode to 3-channel RGB
//! 3. [`compose`]: paste every page onto a max-width × summed-height canvas,
//!    horizontally centered, top to bottom
//! 4. [`encode`]: JPEG at a fixed quality, base64, `data:image/jpeg` URL
//!
//! Every limit is enforced before the entry it concerns is decoded, so an
//! adversarial archive is rejected without allocating its pixel buffers.

pub mod archive;
pub mod compose;
pub mod encode;
pub mod error;
pub mod normalize;

use std::io::Cursor;

use tracing::info;

pub use archive::{image_entries, ArchiveEntry, ImageEntries};
pub use compose::{compose, layout, Layout};
pub use encode::{decode_data_url, encode_data_url, DATA_URL_PREFIX};
pub use error::StitchError;

use crate::config::UploadConfig;

/// Resource ceilings for one stitching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchLimits {
    pub max_archive_entries: usize,
    pub max_entry_bytes: u64,
    pub max_image_dimension: u32,
    pub max_total_pixels: u64,
    pub max_canvas_height: u32,
    pub jpeg_quality: u8,
}

impl Default for StitchLimits {
    fn default() -> Self {
        Self {
            max_archive_entries: 500,
            max_entry_bytes: 32 * 1024 * 1024,
            max_image_dimension: 16_384,
            max_total_pixels: 200_000_000,
            // Baseline JPEG cannot store more rows than this.
            max_canvas_height: 65_535,
            jpeg_quality: 85,
        }
    }
}

impl From<&UploadConfig> for StitchLimits {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_archive_entries: config.max_archive_entries,
            max_entry_bytes: config.max_entry_bytes,
            max_image_dimension: config.max_image_dimension,
            max_total_pixels: config.max_total_pixels,
            max_canvas_height: config.max_canvas_height,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Result of a successful stitching run.
#[derive(Debug, Clone)]
pub struct StitchedChapter {
    pub data_url: String,
    pub images_processed: usize,
    pub width: u32,
    pub height: u32,
}

/// Run the whole pipeline over an in-memory zip archive.
pub fn stitch_archive(bytes: &[u8], limits: &StitchLimits) -> Result<StitchedChapter, StitchError> {
    let entries = image_entries(Cursor::new(bytes), limits)?;
    if entries.is_empty() {
        return Err(StitchError::NoImagesFound);
    }

    let mut pages = Vec::with_capacity(entries.remaining());
    let mut canvas_width = 0u64;
    let mut canvas_height = 0u64;

    for entry in entries {
        let entry = entry?;
        let (width, height) = normalize::probe(&entry, limits)?;

        canvas_width = canvas_width.max(u64::from(width));
        canvas_height += u64::from(height);
        if canvas_height > u64::from(limits.max_canvas_height) {
            return Err(StitchError::limit(format!(
                "stitched chapter would be taller than {} px",
                limits.max_canvas_height
            )));
        }

        // The canvas area bounds every decoded page as well as the composite.
        let canvas_pixels = canvas_width * canvas_height;
        if canvas_pixels > limits.max_total_pixels {
            return Err(StitchError::limit(format!(
                "stitched canvas of {}x{} exceeds {} pixels",
                canvas_width, canvas_height, limits.max_total_pixels
            )));
        }

        pages.push(normalize::normalize(&entry, limits)?);
    }

    let canvas = compose(&pages)?;
    let (width, height) = canvas.dimensions();
    let data_url = encode_data_url(&canvas, limits.jpeg_quality)?;

    info!("Stitched {} pages into a {}x{} composite", pages.len(), width, height);

    Ok(StitchedChapter {
        data_url,
        images_processed: pages.len(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn png(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        png(DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb))))
    }

    fn zip_of(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn decode(stitched: &StitchedChapter) -> RgbImage {
        // Pages are 16 px tall so no JPEG block straddles two of them.
        let jpeg = decode_data_url(&stitched.data_url).unwrap();
        image::load_from_memory(&jpeg).unwrap().into_rgb8()
    }

    fn close(a: &Rgb<u8>, b: [u8; 3]) -> bool {
        a.0.iter().zip(b.iter()).all(|(x, y)| (*x as i16 - *y as i16).abs() <= 12)
    }

    #[test]
    fn stitches_pages_in_filename_order() {
        let archive = zip_of(&[
            ("page_10.png", solid(32, 16, [0, 0, 255])),
            ("page_02.png", solid(32, 16, [255, 0, 0])),
            ("page_1.png", solid(32, 16, [0, 255, 0])),
        ]);

        let stitched = stitch_archive(&archive, &StitchLimits::default()).unwrap();
        assert_eq!(stitched.images_processed, 3);
        assert_eq!((stitched.width, stitched.height), (32, 48));

        let out = decode(&stitched);
        assert!(close(out.get_pixel(16, 8), [255, 0, 0]), "page_02 first");
        assert!(close(out.get_pixel(16, 24), [0, 255, 0]), "page_1 second");
        assert!(close(out.get_pixel(16, 40), [0, 0, 255]), "page_10 last");
    }

    #[test]
    fn mixed_color_models_share_one_canvas() {
        let rgba = png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 0]))));
        let archive = zip_of(&[("a.png", rgba), ("b.png", solid(16, 8, [0, 0, 0]))]);

        let stitched = stitch_archive(&archive, &StitchLimits::default()).unwrap();
        assert_eq!((stitched.width, stitched.height), (16, 16));
    }

    #[test]
    fn archive_without_images_reports_no_images() {
        let archive = zip_of(&[("info.txt", b"chapter notes".to_vec())]);
        let err = stitch_archive(&archive, &StitchLimits::default()).unwrap_err();
        assert!(matches!(err, StitchError::NoImagesFound));
    }

    #[test]
    fn pixel_budget_is_enforced() {
        let archive = zip_of(&[("1.png", solid(10, 10, [1, 1, 1])), ("2.png", solid(10, 10, [2, 2, 2]))]);
        let limits = StitchLimits { max_total_pixels: 150, ..StitchLimits::default() };
        let err = stitch_archive(&archive, &limits).unwrap_err();
        assert!(matches!(err, StitchError::LimitExceeded(_)));
    }

    #[test]
    fn canvas_area_counts_the_widest_page() {
        // 1000 + 1000 decoded pixels, but the canvas is 1000x1001.
        let archive = zip_of(&[("1.png", solid(1000, 1, [1, 1, 1])), ("2.png", solid(1, 1000, [2, 2, 2]))]);
        let limits = StitchLimits { max_total_pixels: 5_000, ..StitchLimits::default() };
        let err = stitch_archive(&archive, &limits).unwrap_err();
        assert!(matches!(err, StitchError::LimitExceeded(_)));
    }

    #[test]
    fn canvas_within_budget_is_accepted() {
        let archive = zip_of(&[("1.png", solid(16, 16, [1, 1, 1])), ("2.png", solid(8, 16, [2, 2, 2]))]);
        let limits = StitchLimits { max_total_pixels: 16 * 32, ..StitchLimits::default() };
        let stitched = stitch_archive(&archive, &limits).unwrap();
        assert_eq!((stitched.width, stitched.height), (16, 32));
    }

    #[test]
    fn canvas_height_is_bounded() {
        let archive = zip_of(&[("1.png", solid(4, 40, [1, 1, 1])), ("2.png", solid(4, 40, [2, 2, 2]))]);
        let limits = StitchLimits { max_canvas_height: 64, ..StitchLimits::default() };
        let err = stitch_archive(&archive, &limits).unwrap_err();
        assert!(matches!(err, StitchError::LimitExceeded(_)));
    }

    #[test]
    fn corrupt_page_is_unsupported() {
        let archive = zip_of(&[("1.png", solid(4, 4, [1, 1, 1])), ("2.jpg", b"garbage".to_vec())]);
        let err = stitch_archive(&archive, &StitchLimits::default()).unwrap_err();
        assert!(matches!(err, StitchError::UnsupportedImageFormat { .. }));
        assert!(!err.is_client_error());
    }
}
