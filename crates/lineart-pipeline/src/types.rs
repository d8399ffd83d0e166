//! Shared types for the line-art pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage`, the three-channel buffer produced by decoding.
pub use image::RgbImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of pixels (`width * height`).
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Tone adjustment applied to the grayscale buffer before outlining.
///
/// The two policies are alternatives: `Linear` replaces the grayscale
/// buffer with a rescaled copy, while `Gamma` keeps the grayscale buffer
/// and adds up to two remapped variants whose outlines are merged into
/// the base outline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ToneParameters {
    /// Pass the grayscale buffer through untouched.
    #[default]
    None,

    /// `output = clamp(input * (1 + contrast / 127) + brightness, 0, 255)`.
    Linear {
        /// Contrast in the open interval `(-127, 127)`.
        contrast: i32,
        /// Brightness offset in the closed interval `[-127, 127]`.
        brightness: i32,
    },

    /// Gamma-remapped variants whose outlines are unioned with the
    /// outline of the unadjusted buffer.
    Gamma {
        /// Gamma greater than 1, revealing edges inside shadows.
        #[serde(default)]
        lighten: Option<f32>,
        /// Gamma in `(0, 1)`, revealing edges inside highlights.
        #[serde(default)]
        darken: Option<f32>,
    },
}

impl ToneParameters {
    /// Short policy name used in logs and diagnostics.
    #[must_use]
    pub const fn policy_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear { .. } => "linear",
            Self::Gamma { .. } => "gamma",
        }
    }

    /// Check that every populated value lies in its domain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] found.
    pub fn validate(&self) -> Result<(), ParameterError> {
        match *self {
            Self::None => Ok(()),
            Self::Linear {
                contrast,
                brightness,
            } => {
                let limit = crate::tone::TONE_LIMIT;
                if contrast <= -limit || contrast >= limit {
                    return Err(ParameterError::ContrastOutOfRange(contrast));
                }
                if !(-limit..=limit).contains(&brightness) {
                    return Err(ParameterError::BrightnessOutOfRange(brightness));
                }
                Ok(())
            }
            Self::Gamma { lighten, darken } => {
                if let Some(gamma) = lighten {
                    check_positive("lighten", gamma)?;
                    if !gamma.is_finite() || gamma <= 1.0 {
                        return Err(ParameterError::LightenOutOfRange(gamma));
                    }
                }
                if let Some(gamma) = darken {
                    check_positive("darken", gamma)?;
                    if gamma >= 1.0 {
                        return Err(ParameterError::DarkenOutOfRange(gamma));
                    }
                }
                Ok(())
            }
        }
    }
}

/// NaN fails this check too.
fn check_positive(name: &'static str, gamma: f32) -> Result<(), ParameterError> {
    if gamma > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositiveGamma { name, value: gamma })
    }
}

/// Raster container used for the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless single-channel PNG.
    #[default]
    Png,
    /// Lossy baseline JPEG.
    Jpeg {
        /// Encoder quality, `1..=100`.
        quality: u8,
    },
}

impl OutputFormat {
    /// MIME type of the encoded output.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Check the encoder settings.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::InvalidJpegQuality`] if the JPEG quality
    /// is outside `1..=100`.
    pub const fn validate(self) -> Result<(), ParameterError> {
        match self {
            Self::Jpeg { quality } if quality == 0 || quality > 100 => {
                Err(ParameterError::InvalidJpegQuality(quality))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => f.write_str("png"),
            Self::Jpeg { quality } => write!(f, "jpeg(q={quality})"),
        }
    }
}

/// Parameters for one pipeline invocation.
///
/// Supplied fresh per call and never mutated by the pipeline. Missing
/// fields fall back to [`PipelineParameters::default`] when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParameters {
    /// Box blur radius in pixels (`0` disables the blur). The window is
    /// `2 * radius + 1` pixels square.
    ///
    /// Signed so that a negative request value can be reported as a
    /// [`ParameterError`] rather than rejected by the deserializer.
    pub blur_radius: i32,

    /// Whether to sharpen the inverted outline image.
    pub sharpen: bool,

    /// Tone adjustment policy.
    pub tone: ToneParameters,

    /// Output raster container.
    pub output_format: OutputFormat,

    /// Upper bound on decoded `width * height`. `0` disables the check.
    pub max_pixels: u64,
}

impl PipelineParameters {
    /// Default blur radius (disabled).
    pub const DEFAULT_BLUR_RADIUS: i32 = 0;

    /// Default JPEG quality when JPEG output is requested without one.
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;

    /// Default pixel ceiling (40 megapixels).
    pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

    /// Check every parameter against its domain.
    ///
    /// Called before any image data is decoded.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] found.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.blur_radius < 0 {
            return Err(ParameterError::NegativeBlurRadius(self.blur_radius));
        }
        if self.blur_radius_px() > crate::blur::MAX_BLUR_RADIUS {
            return Err(ParameterError::BlurRadiusTooLarge(self.blur_radius));
        }
        self.tone.validate()?;
        self.output_format.validate()
    }

    /// Blur radius as an unsigned pixel count. Negative values map to 0;
    /// [`validate`](Self::validate) rejects them before this is used.
    #[must_use]
    pub fn blur_radius_px(&self) -> u32 {
        u32::try_from(self.blur_radius).unwrap_or(0)
    }
}

impl Default for PipelineParameters {
    fn default() -> Self {
        Self {
            blur_radius: Self::DEFAULT_BLUR_RADIUS,
            sharpen: false,
            tone: ToneParameters::default(),
            output_format: OutputFormat::default(),
            max_pixels: Self::DEFAULT_MAX_PIXELS,
        }
    }
}

/// A parameter outside its allowed domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// Blur radius below zero.
    #[error("blur radius must be non-negative, got {0}")]
    NegativeBlurRadius(i32),

    /// Blur radius above [`crate::blur::MAX_BLUR_RADIUS`].
    #[error("blur radius must be at most {max}, got {0}", max = crate::blur::MAX_BLUR_RADIUS)]
    BlurRadiusTooLarge(i32),

    /// Linear contrast outside `(-127, 127)`.
    #[error("contrast must lie strictly between -127 and 127, got {0}")]
    ContrastOutOfRange(i32),

    /// Linear brightness outside `[-127, 127]`.
    #[error("brightness must lie within -127..=127, got {0}")]
    BrightnessOutOfRange(i32),

    /// A gamma value of zero, below zero, or NaN.
    #[error("{name} gamma must be positive, got {value}")]
    NonPositiveGamma {
        /// Which gamma variant was rejected.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Lighten gamma not greater than 1 (or infinite).
    #[error("lighten gamma must be a finite value greater than 1, got {0}")]
    LightenOutOfRange(f32),

    /// Darken gamma not below 1.
    #[error("darken gamma must lie strictly between 0 and 1, got {0}")]
    DarkenOutOfRange(f32),

    /// JPEG quality outside `1..=100`.
    #[error("JPEG quality must lie within 1..=100, got {0}")]
    InvalidJpegQuality(u8),
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input bytes are not a usable image.
    Decode,
    /// A parameter is outside its domain.
    Parameter,
    /// The output could not be serialized.
    Encode,
}

impl ErrorKind {
    /// `true` when the caller supplied bad input, `false` for internal
    /// failures.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(self, Self::Decode | Self::Parameter)
    }
}

/// Errors that can occur during pipeline processing.
///
/// Every error is terminal for the invocation: no partial output is
/// returned and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The decoded image has zero width or height.
    #[error("decoded image has zero width or height")]
    EmptyImage,

    /// The decoded image exceeds the configured pixel ceiling.
    #[error("image is {width}x{height}, above the limit of {max_pixels} pixels")]
    ImageTooLarge {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// The configured ceiling.
        max_pixels: u64,
    },

    /// A parameter is outside its domain.
    #[error("invalid pipeline parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),
}

impl PipelineError {
    /// Which stage family produced this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput
            | Self::ImageDecode(_)
            | Self::EmptyImage
            | Self::ImageTooLarge { .. } => ErrorKind::Decode,
            Self::InvalidParameter(_) => ErrorKind::Parameter,
            Self::ImageEncode(_) => ErrorKind::Encode,
        }
    }
}
