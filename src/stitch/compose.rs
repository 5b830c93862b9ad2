use image::{imageops, RgbImage};

use super::error::StitchError;

/// Canvas size plus the top-left offset of every input, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub offsets: Vec<(u32, u32)>,
}

/// Compute the vertical strip layout for images of the given sizes.
///
/// Narrower images are centered (`floor((W - w) / 2)`); each image starts
/// where the previous one ended.
pub fn layout(sizes: &[(u32, u32)]) -> Result<Layout, StitchError> {
    if sizes.is_empty() {
        return Err(StitchError::EmptyBatch);
    }

    let width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
    let total_height: u64 = sizes.iter().map(|&(_, h)| u64::from(h)).sum();
    let height = u32::try_from(total_height)
        .map_err(|_| StitchError::limit(format!("composite height {} overflows", total_height)))?;

    let mut offsets = Vec::with_capacity(sizes.len());
    let mut y = 0u32;
    for &(w, h) in sizes {
        offsets.push(((width - w) / 2, y));
        y += h;
    }

    Ok(Layout { width, height, offsets })
}

/// Stack `images` top-to-bottom onto one RGB canvas without resizing.
pub fn compose(images: &[RgbImage]) -> Result<RgbImage, StitchError> {
    let sizes: Vec<(u32, u32)> = images.iter().map(RgbImage::dimensions).collect();
    let Layout { width, height, offsets } = layout(&sizes)?;

    let mut canvas = RgbImage::new(width, height);
    for (img, &(x, y)) in images.iter().zip(offsets.iter()) {
        imageops::replace(&mut canvas, img, i64::from(x), i64::from(y));
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(layout(&[]), Err(StitchError::EmptyBatch)));
        assert!(matches!(compose(&[]), Err(StitchError::EmptyBatch)));
    }

    #[test]
    fn canvas_is_max_width_by_summed_height() {
        let l = layout(&[(100, 50), (80, 30), (120, 20)]).unwrap();
        assert_eq!((l.width, l.height), (120, 100));
        assert_eq!(l.offsets, vec![(10, 0), (20, 50), (0, 80)]);
    }

    #[test]
    fn odd_width_difference_rounds_down() {
        let l = layout(&[(10, 1), (7, 1)]).unwrap();
        assert_eq!(l.offsets[1], (1, 1));
    }

    #[test]
    fn pixels_are_copied_exactly_at_their_offsets() {
        let mut top = RgbImage::new(4, 2);
        for (x, y, p) in top.enumerate_pixels_mut() {
            *p = Rgb([x as u8, y as u8, 200]);
        }
        let bottom = RgbImage::from_pixel(2, 3, Rgb([9, 8, 7]));

        let canvas = compose(&[top.clone(), bottom]).unwrap();
        assert_eq!(canvas.dimensions(), (4, 5));

        for (x, y, p) in top.enumerate_pixels() {
            assert_eq!(canvas.get_pixel(x, y), p);
        }
        for y in 2..5 {
            // Centered: (4 - 2) / 2 = 1
            assert_eq!(canvas.get_pixel(1, y), &Rgb([9, 8, 7]));
            assert_eq!(canvas.get_pixel(2, y), &Rgb([9, 8, 7]));
            assert_eq!(canvas.get_pixel(0, y), &Rgb([0, 0, 0]));
            assert_eq!(canvas.get_pixel(3, y), &Rgb([0, 0, 0]));
        }
    }
}
