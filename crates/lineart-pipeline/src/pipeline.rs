//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate_line_art`] which runs the entire pipeline in
//! one call, [`Pipeline`] lets the caller drive execution one step at a
//! time:
//!
//! ```rust
//! # use lineart_pipeline::{Pipeline, PipelineParameters, PipelineError};
//! # fn run(png: &[u8]) -> Result<(), PipelineError> {
//! let params = PipelineParameters::default();
//! let encoded = Pipeline::new(png, params)
//!     .decode()?
//!     .grayscale()
//!     .adjust_tone()?
//!     .blur()
//!     .extract_edges()
//!     .invert()
//!     .sharpen()
//!     .encode()?;
//!
//! let bytes = encoded.into_bytes();
//! # Ok(())
//! # }
//! ```
//!
//! The stages run in a fixed order with no way back:
//! `Pending -> Decoded -> Grayscaled -> ToneAdjusted -> Blurred ->
//! EdgesExtracted -> Inverted -> Sharpened -> Encoded`. Each stage method
//! consumes `self` and returns the next state (or `Result` for fallible
//! stages). A failure ends the run; nothing partial is returned.
//!
//! # Memory
//!
//! Each stage keeps only its own output and drops the previous buffer,
//! so at most the candidate set of the tone stage (up to three grayscale
//! buffers) is alive at once.

use crate::diagnostics::{StageMetrics, count_nonzero_pixels, count_white_pixels};
use crate::tone::ToneOutput;
use crate::types::{
    Dimensions, GrayImage, OutputFormat, PipelineError, PipelineParameters, RgbImage,
};

/// Entry point for stage-by-stage execution.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over encoded image bytes.
    ///
    /// Nothing is validated or decoded until [`Pending::decode`].
    pub const fn new(source: &[u8], params: PipelineParameters) -> Pending<'_> {
        Pending { params, source }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending<'a> {
    params: PipelineParameters,
    source: &'a [u8],
}

impl Pending<'_> {
    /// The raw source image bytes.
    #[must_use]
    pub const fn source(&self) -> &[u8] {
        self.source
    }

    /// Validate the parameters, then decode the source image.
    ///
    /// Parameters are checked first, so a bad parameter is reported
    /// without touching the image data.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] for out-of-domain
    /// parameters, and [`PipelineError::EmptyInput`],
    /// [`PipelineError::ImageDecode`], [`PipelineError::EmptyImage`] or
    /// [`PipelineError::ImageTooLarge`] when decoding fails.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.params.validate()?;
        let rgb = crate::decode::decode(self.source, self.params.max_pixels)?;
        tracing::debug!(
            input_bytes = self.source.len(),
            width = rgb.width(),
            height = rgb.height(),
            "decoded"
        );
        Ok(Decoded {
            params: self.params,
            rgb,
            source_len: self.source.len(),
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding: a three-channel buffer.
#[must_use = "pipeline stages are consumed by advancing; call .grayscale() to continue"]
pub struct Decoded {
    params: PipelineParameters,
    rgb: RgbImage,
    source_len: usize,
}

impl Decoded {
    /// The decoded RGB image.
    #[must_use]
    pub const fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Source image dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.rgb.width(),
            height: self.rgb.height(),
        }
    }

    /// Metrics for the decode stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        let dimensions = self.dimensions();
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width: dimensions.width,
            height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
        }
    }

    /// Reduce to a single luma channel.
    pub fn grayscale(self) -> Grayscaled {
        let dimensions = self.dimensions();
        let gray = crate::decode::grayscale(&self.rgb);
        tracing::trace!("grayscale converted");
        Grayscaled {
            params: self.params,
            gray,
            dimensions,
        }
    }
}

// ───────────────────────── Stage 2: Grayscaled ───────────────────────

/// Pipeline state after grayscale conversion.
#[must_use = "pipeline stages are consumed by advancing; call .adjust_tone() to continue"]
pub struct Grayscaled {
    params: PipelineParameters,
    gray: GrayImage,
    dimensions: Dimensions,
}

impl Grayscaled {
    /// The grayscale image.
    #[must_use]
    pub const fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Metrics for the grayscale stage.
    #[must_use]
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Grayscale {
            width: self.dimensions.width,
            height: self.dimensions.height,
        }
    }

    /// Apply the configured tone policy.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if the tone
    /// parameters are out of domain.
    pub fn adjust_tone(self) -> Result<ToneAdjusted, PipelineError> {
        let tone = crate::tone::adjust(self.gray, &self.params.tone)?;
        Ok(ToneAdjusted {
            params: self.params,
            tone,
            dimensions: self.dimensions,
        })
    }
}

// ───────────────────────── Stage 3: ToneAdjusted ─────────────────────

/// Pipeline state after tone adjustment: a base buffer plus zero, one
/// or two gamma variants.
#[must_use = "pipeline stages are consumed by advancing; call .blur() to continue"]
pub struct ToneAdjusted {
    params: PipelineParameters,
    tone: ToneOutput,
    dimensions: Dimensions,
}

impl ToneAdjusted {
    /// The base buffer and its variants.
    #[must_use]
    pub const fn tone(&self) -> &ToneOutput {
        &self.tone
    }

    /// Metrics for the tone stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Tone {
            policy: self.params.tone.policy_name().to_string(),
            variant_count: self.tone.variants.len(),
        }
    }

    /// Blur every candidate buffer.
    pub fn blur(self) -> Blurred {
        let radius = self.params.blur_radius_px();
        let candidates = crate::blur::blur_all(self.tone.into_candidates(), radius);
        tracing::trace!(radius, candidates = candidates.len(), "blurred");
        Blurred {
            params: self.params,
            candidates,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 4: Blurred ──────────────────────────

/// Pipeline state after blurring. The base buffer comes first.
#[must_use = "pipeline stages are consumed by advancing; call .extract_edges() to continue"]
pub struct Blurred {
    params: PipelineParameters,
    candidates: Vec<GrayImage>,
    dimensions: Dimensions,
}

impl Blurred {
    /// The blurred candidate buffers.
    #[must_use]
    pub fn candidates(&self) -> &[GrayImage] {
        &self.candidates
    }

    /// Metrics for the blur stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Blur {
            radius: self.params.blur_radius_px(),
            candidate_count: self.candidates.len(),
        }
    }

    /// Outline every candidate and merge the outlines.
    pub fn extract_edges(self) -> EdgesExtracted {
        let outline = crate::edge::combined_outline(&self.candidates).unwrap_or_else(|| {
            GrayImage::new(self.dimensions.width, self.dimensions.height)
        });
        tracing::debug!(
            candidates = self.candidates.len(),
            edge_pixels = count_nonzero_pixels(&outline),
            "outline extracted"
        );
        EdgesExtracted {
            params: self.params,
            outline,
            candidate_count: self.candidates.len(),
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 5: EdgesExtracted ───────────────────

/// Pipeline state after outline extraction: bright strokes on black.
#[must_use = "pipeline stages are consumed by advancing; call .invert() to continue"]
pub struct EdgesExtracted {
    params: PipelineParameters,
    outline: GrayImage,
    candidate_count: usize,
    dimensions: Dimensions,
}

impl EdgesExtracted {
    /// The combined outline image.
    #[must_use]
    pub const fn outline(&self) -> &GrayImage {
        &self.outline
    }

    /// Metrics for the edge extraction stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::EdgeExtraction {
            candidate_count: self.candidate_count,
            edge_pixel_count: count_nonzero_pixels(&self.outline),
            total_pixel_count: self.dimensions.pixel_count(),
        }
    }

    /// Invert into dark strokes on white.
    pub fn invert(self) -> Inverted {
        let image = crate::finalize::invert(&self.outline);
        Inverted {
            params: self.params,
            image,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 6: Inverted ─────────────────────────

/// Pipeline state after inversion.
#[must_use = "pipeline stages are consumed by advancing; call .sharpen() to continue"]
pub struct Inverted {
    params: PipelineParameters,
    image: GrayImage,
    dimensions: Dimensions,
}

impl Inverted {
    /// The inverted image.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Metrics for the invert stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Invert {
            white_pixel_count: count_white_pixels(&self.image),
        }
    }

    /// Sharpen if `params.sharpen` is set; otherwise pass through.
    pub fn sharpen(self) -> Sharpened {
        let applied = self.params.sharpen;
        let image = if applied {
            crate::finalize::sharpen(&self.image)
        } else {
            self.image
        };
        tracing::trace!(applied, "sharpen stage done");
        Sharpened {
            format: self.params.output_format,
            image,
            applied,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 7: Sharpened ────────────────────────

/// Pipeline state after the optional sharpen: the finished raster.
#[must_use = "pipeline stages are consumed by advancing; call .encode() to continue"]
pub struct Sharpened {
    format: OutputFormat,
    image: GrayImage,
    applied: bool,
    dimensions: Dimensions,
}

impl Sharpened {
    /// The finished line-art image.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Whether sharpening actually ran.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Metrics for the sharpen stage.
    #[must_use]
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Sharpen {
            applied: self.applied,
        }
    }

    /// Take the finished raster without encoding it.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Serialize the finished image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ImageEncode`] if the encoder fails.
    pub fn encode(self) -> Result<Encoded, PipelineError> {
        let bytes = crate::encode::encode(&self.image, self.format)?;
        tracing::debug!(format = %self.format, output_bytes = bytes.len(), "encoded");
        Ok(Encoded {
            bytes,
            format: self.format,
            dimensions: self.dimensions,
        })
    }
}

// ───────────────────────── Stage 8: Encoded ──────────────────────────

/// Terminal pipeline state: the encoded output.
#[must_use = "call .into_bytes() to take the encoded image"]
pub struct Encoded {
    bytes: Vec<u8>,
    format: OutputFormat,
    dimensions: Dimensions,
}

impl Encoded {
    /// The encoded image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The container the bytes are in.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output dimensions (always equal to the source dimensions).
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Metrics for the encode stage.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Encode {
            format: self.format.to_string(),
            output_bytes: self.bytes.len(),
        }
    }

    /// Consume the state and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
