//! Outline extraction by morphological gradient.
//!
//! The gradient of a grayscale image is its dilation minus its erosion
//! under a small structuring element: flat regions go to zero and any
//! pixel whose neighbourhood spans a range of intensities lights up in
//! proportion to that range.
//!
//! The structuring element is a 2x2 square anchored at its bottom-right
//! cell, so the neighbourhood of `(x, y)` is
//! `{(x-1, y-1), (x, y-1), (x-1, y), (x, y)}`. Cells that fall outside
//! the image are ignored rather than padded.
//!
//! When the tone stage yields several candidate buffers, each is
//! outlined independently and the outlines are merged with a per-pixel
//! bitwise OR: a stroke appears wherever any candidate has an edge.

use crate::types::GrayImage;

/// Backward offsets `(dx, dy)` of the 2x2 structuring element from its
/// anchor.
pub const STRUCTURING_ELEMENT: [(u32, u32); 4] = [(1, 1), (0, 1), (1, 0), (0, 0)];

/// Fold every in-bounds neighbourhood sample of `(x, y)` with `pick`.
fn neighbourhood(image: &GrayImage, x: u32, y: u32, pick: fn(u8, u8) -> u8) -> u8 {
    let own = image.get_pixel(x, y).0[0];
    STRUCTURING_ELEMENT
        .iter()
        .filter_map(|&(dx, dy)| Some((x.checked_sub(dx)?, y.checked_sub(dy)?)))
        .map(|(nx, ny)| image.get_pixel(nx, ny).0[0])
        .fold(own, pick)
}

/// Grayscale dilation: each pixel becomes its neighbourhood maximum.
#[must_use = "returns the dilated image"]
pub fn dilate(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([neighbourhood(image, x, y, u8::max)])
    })
}

/// Grayscale erosion: each pixel becomes its neighbourhood minimum.
#[must_use = "returns the eroded image"]
pub fn erode(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([neighbourhood(image, x, y, u8::min)])
    })
}

/// Morphological gradient: `dilate(image) - erode(image)`.
///
/// Computed in a single pass; the result equals subtracting the two
/// images produced by [`dilate`] and [`erode`].
#[must_use = "returns the outline image"]
pub fn morphological_gradient(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let high = neighbourhood(image, x, y, u8::max);
        let low = neighbourhood(image, x, y, u8::min);
        image::Luma([high - low])
    })
}

/// Merge `other` into `acc` with a per-pixel bitwise OR.
///
/// Both images must have the same dimensions.
pub fn union_into(acc: &mut GrayImage, other: &GrayImage) {
    debug_assert_eq!(acc.dimensions(), other.dimensions());
    for (a, b) in acc.pixels_mut().zip(other.pixels()) {
        a.0[0] |= b.0[0];
    }
}

/// Outline every candidate and merge the outlines.
///
/// Returns `None` only when `candidates` is empty.
#[must_use = "returns the combined outline image"]
pub fn combined_outline<'a, I>(candidates: I) -> Option<GrayImage>
where
    I: IntoIterator<Item = &'a GrayImage>,
{
    let mut iter = candidates.into_iter();
    let mut combined = morphological_gradient(iter.next()?);
    for candidate in iter {
        union_into(&mut combined, &morphological_gradient(candidate));
    }
    Some(combined)
}
