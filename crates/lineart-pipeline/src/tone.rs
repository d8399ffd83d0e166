//! Tone adjustment: linear contrast/brightness or gamma remapping.
//!
//! Both policies are point operations, so each is expressed as a
//! 256-entry lookup table applied to every sample.
//!
//! [`adjust`] turns the grayscale buffer into a [`ToneOutput`]: one
//! base buffer plus zero or more variants. The edge extractor outlines
//! every buffer in it and unions the results, so soft highlight and
//! shadow boundaries that vanish at normal exposure can still produce
//! strokes.

use crate::types::{GrayImage, ParameterError, ToneParameters};

/// Scale of the linear contrast and brightness parameters.
///
/// Contrast must lie in `(-TONE_LIMIT, TONE_LIMIT)` and brightness in
/// `[-TONE_LIMIT, TONE_LIMIT]`.
pub const TONE_LIMIT: i32 = 127;

/// A 256-entry lookup table mapping input samples to output samples.
pub type ToneTable = [u8; 256];

/// The buffers produced by the tone stage.
#[derive(Debug, Clone)]
pub struct ToneOutput {
    /// The primary buffer: the grayscale input for the pass-through and
    /// gamma policies, the rescaled buffer for the linear policy.
    pub base: GrayImage,
    /// Gamma-remapped variants (empty unless the gamma policy is active).
    pub variants: Vec<GrayImage>,
}

impl ToneOutput {
    /// The base buffer followed by every variant.
    pub fn candidates(&self) -> impl Iterator<Item = &GrayImage> {
        std::iter::once(&self.base).chain(self.variants.iter())
    }

    /// Consume the output, yielding the base buffer first.
    #[must_use]
    pub fn into_candidates(self) -> Vec<GrayImage> {
        let mut all = Vec::with_capacity(1 + self.variants.len());
        all.push(self.base);
        all.extend(self.variants);
        all
    }
}

/// Round and clamp a float sample into `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Build the table for `output = input * (1 + contrast / 127) + brightness`.
///
/// Out-of-domain values are not checked here; see
/// [`ToneParameters::validate`].
#[must_use]
pub fn linear_table(contrast: i32, brightness: i32) -> ToneTable {
    let alpha = 1.0 + f64::from(contrast) / f64::from(TONE_LIMIT);
    let beta = f64::from(brightness);
    std::array::from_fn(|i| {
        #[allow(clippy::cast_precision_loss)]
        let input = i as f64;
        clamp_sample(input.mul_add(alpha, beta))
    })
}

/// Build the table for `output = (input / 255) ^ (1 / gamma) * 255`.
///
/// `table[0]` is always 0 and `table[255]` always 255. For `gamma > 1`
/// the curve lifts shadows, for `gamma < 1` it deepens highlights.
///
/// # Errors
///
/// Returns [`ParameterError::NonPositiveGamma`] if `gamma` is zero,
/// negative, or NaN.
pub fn gamma_table(gamma: f32) -> Result<ToneTable, ParameterError> {
    if gamma.is_nan() || gamma <= 0.0 {
        return Err(ParameterError::NonPositiveGamma {
            name: "gamma",
            value: gamma,
        });
    }
    let exponent = 1.0 / f64::from(gamma);
    Ok(std::array::from_fn(|i| {
        #[allow(clippy::cast_precision_loss)]
        let normalized = i as f64 / 255.0;
        clamp_sample(normalized.powf(exponent) * 255.0)
    }))
}

/// Remap every sample of `image` through `table`.
#[must_use = "returns the remapped image"]
pub fn apply_table(image: &GrayImage, table: &ToneTable) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = table[usize::from(pixel.0[0])];
    }
    out
}

/// Run the tone stage.
///
/// Takes ownership of the grayscale buffer so the pass-through and gamma
/// policies can keep it as the base without copying.
///
/// # Errors
///
/// Returns a [`ParameterError`] if `tone` fails validation.
pub fn adjust(gray: GrayImage, tone: &ToneParameters) -> Result<ToneOutput, ParameterError> {
    tone.validate()?;
    let output = match *tone {
        ToneParameters::None => ToneOutput {
            base: gray,
            variants: Vec::new(),
        },
        ToneParameters::Linear {
            contrast,
            brightness,
        } => ToneOutput {
            base: apply_table(&gray, &linear_table(contrast, brightness)),
            variants: Vec::new(),
        },
        ToneParameters::Gamma { lighten, darken } => {
            let variants = [lighten, darken]
                .into_iter()
                .flatten()
                .map(|gamma| gamma_table(gamma).map(|table| apply_table(&gray, &table)))
                .collect::<Result<Vec<_>, _>>()?;
            ToneOutput {
                base: gray,
                variants,
            }
        }
    };
    tracing::debug!(
        policy = tone.policy_name(),
        variants = output.variants.len(),
        "tone adjusted"
    );
    Ok(output)
}
