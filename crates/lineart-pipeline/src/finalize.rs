//! Inversion and optional sharpening of the combined outline.
//!
//! The outline image has bright strokes on a black field; inverting it
//! gives dark strokes on white paper. Sharpening then crisps the
//! strokes with a fixed 3x3 Laplacian-style kernel.

use imageproc::filter::filter_clamped;
use imageproc::kernel::Kernel;

use crate::types::GrayImage;

/// Row-major 3x3 sharpening kernel.
pub const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// Invert every sample (`255 - value`, i.e. bitwise NOT).
///
/// Applying this twice returns the original image exactly.
#[must_use = "returns the inverted image"]
pub fn invert(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([!image.get_pixel(x, y).0[0]])
    })
}

/// Convolve with [`SHARPEN_KERNEL`].
///
/// Borders are handled by edge replication and results are clamped to
/// `0..=255`.
#[must_use = "returns the sharpened image"]
pub fn sharpen(image: &GrayImage) -> GrayImage {
    filter_clamped(image, Kernel::new(&SHARPEN_KERNEL, 3, 3))
}
