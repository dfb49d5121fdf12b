//! Buffer-level grading: the per-pixel transform mapped over an image.

use rayon::prelude::*;

use crate::image::{CHANNELS, GradedImage, PixelBuffer, normalize};
use crate::transform::evaluate::grade_pixel;
use crate::transform::params::GradingParams;

/// Grade every pixel of an 8-bit buffer into a float image.
///
/// Pixels are independent, so the map runs on the rayon pool. Output order
/// matches input order. Output values are left unclamped; quantise with
/// [`GradedImage::to_pixel_buffer`] for display or export.
pub fn grade_image(buffer: &PixelBuffer, params: &GradingParams) -> GradedImage {
    if params.is_identity() {
        tracing::debug!("identity grade, normalising only");
        return GradedImage::from_pixel_buffer(buffer);
    }

    let pixels: Vec<[f32; 4]> = buffer
        .as_bytes()
        .par_chunks_exact(CHANNELS)
        .map(|px| grade_pixel(normalize([px[0], px[1], px[2], px[3]]), params))
        .collect();

    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        ?params,
        "graded image"
    );

    GradedImage {
        width: buffer.width(),
        height: buffer.height(),
        pixels,
    }
}

/// Grade an already-float image, e.g. to stack a second grade.
pub fn grade_graded(image: &GradedImage, params: &GradingParams) -> GradedImage {
    if params.is_identity() {
        return image.clone();
    }
    let pixels = image
        .pixels
        .par_iter()
        .map(|&px| grade_pixel(px, params))
        .collect();
    GradedImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer() -> PixelBuffer {
        let pixels: Vec<[u8; 4]> = (0..64u32)
            .map(|i| [(i * 4) as u8, (255 - i * 3) as u8, (i * 2) as u8, (i % 7 * 30) as u8])
            .collect();
        PixelBuffer::from_pixels(8, 8, &pixels).unwrap()
    }

    #[test]
    fn test_identity_grade_round_trips_bytes() {
        let buffer = sample_buffer();
        let graded = grade_image(&buffer, &GradingParams::default());
        assert_eq!(graded.to_pixel_buffer(), buffer);
    }

    #[test]
    fn test_grade_image_matches_per_pixel() {
        let buffer = sample_buffer();
        let params = GradingParams {
            brightness: 0.05,
            contrast: 0.4,
            exposure: 0.3,
            linearize: true,
        };
        let graded = grade_image(&buffer, &params);
        assert_eq!(graded.pixels.len(), buffer.pixel_count());
        for (src, dst) in buffer.pixels().zip(&graded.pixels) {
            let expected = grade_pixel(normalize(src), &params);
            for c in 0..4 {
                assert!(
                    (expected[c] - dst[c]).abs() < 1e-6
                        || (expected[c].is_nan() && dst[c].is_nan())
                );
            }
        }
    }

    #[test]
    fn test_bright_grade_exceeds_range_until_quantised() {
        let buffer = PixelBuffer::filled(2, 2, [230, 230, 230, 255]).unwrap();
        let params = GradingParams {
            exposure: 1.0,
            ..Default::default()
        };
        let graded = grade_image(&buffer, &params);
        assert_eq!(graded.out_of_range_count(), 4);
        let quantised = graded.to_pixel_buffer();
        assert!(quantised.pixels().all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_grade_graded_stacks() {
        let buffer = sample_buffer();
        let once = GradingParams {
            brightness: 0.1,
            ..Default::default()
        };
        let twice = GradingParams {
            brightness: 0.2,
            ..Default::default()
        };
        let stacked = grade_graded(&grade_image(&buffer, &once), &once);
        let direct = grade_image(&buffer, &twice);
        for (a, b) in stacked.pixels.iter().zip(&direct.pixels) {
            for c in 0..4 {
                assert!((a[c] - b[c]).abs() < 1e-5);
            }
        }
    }
}
