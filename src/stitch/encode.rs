use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

use super::error::StitchError;

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Encode `canvas` as a baseline JPEG at `quality` (1-100).
pub fn encode_jpeg(canvas: &RgbImage, quality: u8) -> Result<Vec<u8>, StitchError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(canvas)
        .map_err(StitchError::Encode)?;
    Ok(buf)
}

/// Encode `canvas` as JPEG and wrap the base64 payload in a data-URL.
pub fn encode_data_url(canvas: &RgbImage, quality: u8) -> Result<String, StitchError> {
    let jpeg = encode_jpeg(canvas, quality)?;
    let payload = STANDARD.encode(&jpeg);
    debug!("Encoded {}x{} composite → {} bytes base64", canvas.width(), canvas.height(), payload.len());
    Ok(format!("{}{}", DATA_URL_PREFIX, payload))
}

/// Inverse of [`encode_data_url`]: recover the JPEG bytes from a data-URL.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let payload = url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn data_url_carries_a_decodable_jpeg() {
        let canvas = RgbImage::from_pixel(16, 24, Rgb([200, 10, 10]));
        let url = encode_data_url(&canvas, 85).expect("encode should succeed");
        assert!(url.starts_with(DATA_URL_PREFIX));

        let jpeg = decode_data_url(&url).expect("valid base64 payload");
        let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 24));
    }

    #[test]
    fn encoding_is_deterministic() {
        let canvas = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 0]));
        assert_eq!(encode_jpeg(&canvas, 85).unwrap(), encode_jpeg(&canvas, 85).unwrap());
    }

    #[test]
    fn foreign_data_urls_are_ignored() {
        assert!(decode_data_url("data:image/png;base64,AAAA").is_none());
    }
}
