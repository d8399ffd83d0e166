//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP, GIF) and produces a
//! three-channel RGB buffer, which [`grayscale`] then reduces to a
//! single luma channel.
//!
//! The container's header is inspected before any pixel data is
//! decoded so that images above the configured pixel ceiling are
//! rejected without allocating their buffers.

use std::io::Cursor;

use image::{ImageReader, RgbImage};

use crate::types::{Dimensions, GrayImage, PipelineError};

/// Build a reader over `bytes` with the container format sniffed from
/// its magic number.
fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, PipelineError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::ImageDecode(e.into()))
}

/// Read only the image header and return its dimensions.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty and
/// [`PipelineError::ImageDecode`] if the container is unrecognized.
pub fn probe_dimensions(bytes: &[u8]) -> Result<Dimensions, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let (width, height) = reader(bytes)?.into_dimensions()?;
    Ok(Dimensions { width, height })
}

/// Decode raw image bytes into an RGB buffer.
///
/// `max_pixels` bounds `width * height`; `0` disables the bound.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty,
/// [`PipelineError::ImageDecode`] if the format is unrecognized or the
/// data is truncated or corrupt, [`PipelineError::EmptyImage`] if either
/// dimension is zero, and [`PipelineError::ImageTooLarge`] if the pixel
/// count exceeds `max_pixels`.
pub fn decode(bytes: &[u8], max_pixels: u64) -> Result<RgbImage, PipelineError> {
    let dimensions = probe_dimensions(bytes)?;
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(PipelineError::EmptyImage);
    }
    if max_pixels > 0 && dimensions.pixel_count() > max_pixels {
        tracing::warn!(
            width = dimensions.width,
            height = dimensions.height,
            max_pixels,
            "rejecting oversized image"
        );
        return Err(PipelineError::ImageTooLarge {
            width: dimensions.width,
            height: dimensions.height,
            max_pixels,
        });
    }

    let img = reader(bytes)?.decode()?;
    Ok(img.to_rgb8())
}

/// Rec. 601 luma weights `(0.299, 0.587, 0.114)` in 14-bit fixed point.
/// They sum to `1 << LUMA_SHIFT`, so gray inputs map to themselves.
pub const LUMA_WEIGHTS: [u32; 3] = [4899, 9617, 1868];

const LUMA_SHIFT: u32 = 14;

/// Reduce an RGB buffer to a single luma channel.
///
/// `Y = 0.299 R + 0.587 G + 0.114 B`, rounded. Dimensions are preserved.
#[must_use = "returns the grayscale image"]
pub fn grayscale(rgb: &RgbImage) -> GrayImage {
    let [wr, wg, wb] = LUMA_WEIGHTS;
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let sum = u32::from(r) * wr + u32::from(g) * wg + u32::from(b) * wb;
        let luma = (sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT;
        image::Luma([u8::try_from(luma).unwrap_or(u8::MAX)])
    })
}
