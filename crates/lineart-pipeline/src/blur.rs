//! Box blur for softening texture before outlining.
//!
//! Wraps [`imageproc::filter::box_filter`], a mean filter over a
//! `(2r + 1) x (2r + 1)` window with edge-replicated borders. Fine
//! texture (grain, foliage, fabric) otherwise turns into a dense mesh of
//! strokes in the morphological gradient.

use crate::types::GrayImage;

/// Largest accepted blur radius in pixels.
///
/// The box filter sums `2r + 1` samples per row and column in `u32`
/// arithmetic; radii far beyond this overflow it.
pub const MAX_BLUR_RADIUS: u32 = 1024;

/// Apply a box blur of the given radius to a grayscale image.
///
/// A radius of zero returns the image unchanged (bit-identical copy).
/// Radii above [`MAX_BLUR_RADIUS`] are clamped to it.
#[must_use = "returns the blurred image"]
pub fn box_blur(image: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }

    let radius = radius.min(MAX_BLUR_RADIUS);
    imageproc::filter::box_filter(image, radius, radius)
}

/// Blur every candidate buffer with the same radius.
///
/// Consumes the candidates so the disabled case moves them through
/// without copying.
#[must_use = "returns the blurred candidates"]
pub fn blur_all(candidates: Vec<GrayImage>, radius: u32) -> Vec<GrayImage> {
    if radius == 0 {
        return candidates;
    }
    candidates
        .iter()
        .map(|image| box_blur(image, radius))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sharp_edge_gray;

    #[test]
    fn zero_radius_returns_identical_image() {
        let img = sharp_edge_gray(10, 10);
        let blurred = box_blur(&img, 0);
        assert_eq!(img, blurred);
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = GrayImage::new(17, 31);
        let blurred = box_blur(&img, 3);
        assert_eq!(blurred.width(), 17);
        assert_eq!(blurred.height(), 31);
    }

    #[test]
    fn blur_smooths_sharp_edge() {
        let img = sharp_edge_gray(10, 10);
        let blurred = box_blur(&img, 2);

        let left_of_edge = blurred.get_pixel(4, 5).0[0];
        let right_of_edge = blurred.get_pixel(5, 5).0[0];

        assert!(
            left_of_edge > 0,
            "expected blur to raise left-of-edge above 0, got {left_of_edge}",
        );
        assert!(
            right_of_edge < 255,
            "expected blur to lower right-of-edge below 255, got {right_of_edge}",
        );
    }

    #[test]
    fn uniform_image_unchanged_by_blur() {
        let img = GrayImage::from_fn(10, 10, |_, _| image::Luma([128]));
        let blurred = box_blur(&img, 2);
        for pixel in blurred.pixels() {
            let diff = i16::from(pixel.0[0]) - 128;
            assert!(
                diff.abs() <= 1,
                "expected uniform image to stay near 128 after blur, got {}",
                pixel.0[0],
            );
        }
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let img = sharp_edge_gray(4, 4);
        let clamped = box_blur(&img, u32::MAX);
        assert_eq!(clamped, box_blur(&img, MAX_BLUR_RADIUS));
        assert_eq!(clamped.dimensions(), (4, 4));
    }

    #[test]
    fn blur_all_disabled_is_pass_through() {
        let a = sharp_edge_gray(6, 6);
        let b = GrayImage::from_pixel(6, 6, image::Luma([9]));
        let out = blur_all(vec![a.clone(), b.clone()], 0);
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn blur_all_blurs_each_candidate() {
        let a = sharp_edge_gray(8, 8);
        let out = blur_all(vec![a.clone(), a.clone()], 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], box_blur(&a, 1));
        assert_eq!(out[1], box_blur(&a, 1));
        assert_ne!(out[0], a);
    }
}
