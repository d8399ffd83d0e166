//! In-memory image fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use image::{GrayImage, ImageEncoder, RgbImage};

/// Encode an RGB image as PNG bytes.
pub fn png_from_rgb(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

/// A uniform RGB image encoded as PNG.
pub fn solid_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    png_from_rgb(&RgbImage::from_pixel(
        width,
        height,
        image::Rgb([value, value, value]),
    ))
}

/// Grayscale image with a sharp vertical boundary at `x = width / 2`.
pub fn sharp_edge_gray(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _y| {
        if x < width / 2 {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}
