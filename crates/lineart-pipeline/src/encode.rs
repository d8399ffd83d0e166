//! Serialization of the finished single-channel image.

use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use crate::types::{GrayImage, OutputFormat, PipelineError};

/// Encode a grayscale image into the requested container.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if the encoder fails. This is
/// not expected for a well-formed buffer.
pub fn encode(image: &GrayImage, format: OutputFormat) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    let (width, height) = image.dimensions();
    let written = match format {
        OutputFormat::Png => PngEncoder::new(&mut buf).write_image(
            image.as_raw(),
            width,
            height,
            image::ExtendedColorType::L8,
        ),
        OutputFormat::Jpeg { quality } => JpegEncoder::new_with_quality(&mut buf, quality)
            .write_image(image.as_raw(), width, height, image::ExtendedColorType::L8),
    };
    written.map_err(PipelineError::ImageEncode)?;
    Ok(buf)
}
