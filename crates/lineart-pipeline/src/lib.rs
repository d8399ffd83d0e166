//! lineart-pipeline: Pure colouring-book line-art pipeline (sans-IO).
//!
//! Converts a photograph into black strokes on a white background
//! through:
//! decode -> grayscale -> tone -> blur -> outline -> invert ->
//! optional sharpen -> encode.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns encoded bytes. Transport framing (base64,
//! JSON requests) lives in `lineart-request`; files and the command line
//! live in `lineart-cli`.

pub mod blur;
pub mod decode;
pub mod diagnostics;
pub mod edge;
pub mod encode;
pub mod finalize;
pub mod pipeline;
pub mod tone;
pub mod types;

#[cfg(test)]
mod testing;

pub use diagnostics::{Clock, PipelineDiagnostics, generate_line_art_with_diagnostics};
pub use pipeline::Pipeline;
pub use types::{
    Dimensions, ErrorKind, OutputFormat, ParameterError, PipelineError, PipelineParameters,
    ToneParameters,
};

/// Run the full line-art pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP, GIF) and a parameter
/// set, then produces the encoded line drawing. The output always has
/// the same width and height as the source.
///
/// # Pipeline steps
///
/// 1. Validate parameters and decode the image
/// 2. Convert to single-channel grayscale
/// 3. Tone adjustment (none, linear, or gamma variants)
/// 4. Box blur of every candidate buffer
/// 5. Morphological-gradient outline of each candidate, merged with OR
/// 6. Invert to dark strokes on white
/// 7. Optional sharpening
/// 8. Encode as PNG or JPEG
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] before any decoding if a
/// parameter is out of range.
/// Returns [`PipelineError::EmptyInput`], [`PipelineError::ImageDecode`],
/// [`PipelineError::EmptyImage`] or [`PipelineError::ImageTooLarge`] if
/// the bytes do not yield a usable image.
/// Returns [`PipelineError::ImageEncode`] if the encoder fails.
pub fn generate_line_art(
    image_bytes: &[u8],
    params: &PipelineParameters,
) -> Result<Vec<u8>, PipelineError> {
    let span = tracing::debug_span!(
        "generate_line_art",
        input_bytes = image_bytes.len(),
        tone = params.tone.policy_name(),
    );
    let _enter = span.enter();

    let encoded = Pipeline::new(image_bytes, params.clone())
        .decode()?
        .grayscale()
        .adjust_tone()?
        .blur()
        .extract_edges()
        .invert()
        .sharpen()
        .encode()?;

    tracing::debug!(
        width = encoded.dimensions().width,
        height = encoded.dimensions().height,
        output_bytes = encoded.bytes().len(),
        "line art generated"
    );
    Ok(encoded.into_bytes())
}
