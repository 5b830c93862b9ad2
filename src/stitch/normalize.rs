use std::io::Cursor;

use image::{ImageError, ImageReader, Limits, RgbImage};

use super::archive::ArchiveEntry;
use super::error::StitchError;
use super::StitchLimits;

/// Read the pixel dimensions from the entry's header without decoding it.
pub fn probe(entry: &ArchiveEntry, limits: &StitchLimits) -> Result<(u32, u32), StitchError> {
    let (width, height) = reader_for(&entry.bytes, limits)
        .into_dimensions()
        .map_err(|e| decode_error(&entry.name, e))?;

    if width > limits.max_image_dimension || height > limits.max_image_dimension {
        return Err(StitchError::limit(format!(
            "'{}' is {}x{}, maximum dimension is {}",
            entry.name, width, height, limits.max_image_dimension
        )));
    }

    Ok((width, height))
}

/// Decode `entry` and return it as 8-bit, 3-channel RGB.
///
/// Callers [`probe`] first; the decoder carries the same dimension limits as
/// a backstop. Alpha is dropped, not composited; palette and grayscale images
/// are expanded.
pub fn normalize(entry: &ArchiveEntry, limits: &StitchLimits) -> Result<RgbImage, StitchError> {
    let decoded = reader_for(&entry.bytes, limits)
        .decode()
        .map_err(|e| decode_error(&entry.name, e))?;

    Ok(match decoded {
        image::DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.into_rgb8(),
    })
}

fn decode_error(name: &str, err: ImageError) -> StitchError {
    match err {
        ImageError::Limits(limit) => StitchError::limit(format!("'{}': {}", name, limit)),
        source => StitchError::UnsupportedImageFormat { name: name.to_string(), source },
    }
}

fn reader_for<'a>(bytes: &'a [u8], limits: &StitchLimits) -> ImageReader<Cursor<&'a [u8]>> {
    // Guessing only reads from an in-memory cursor; an unknown format surfaces at decode time.
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap_or_else(|_| ImageReader::new(Cursor::new(bytes)));

    let mut decoder_limits = Limits::default();
    decoder_limits.max_image_width = Some(limits.max_image_dimension);
    decoder_limits.max_image_height = Some(limits.max_image_dimension);
    reader.limits(decoder_limits);

    reader
}
