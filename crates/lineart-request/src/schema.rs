//! JSON request and response documents.
//!
//! The tone policy is chosen by which fields the caller populates:
//! `contrast_val`/`brighten_val` select the linear policy,
//! `light_val`/`dark_val` select the gamma policy, and neither leaves the
//! grayscale buffer untouched.

use lineart_pipeline::{PipelineParameters, ToneParameters};
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Boolean that also accepts an integer (`0` is off, anything else on).
///
/// Serializes back in the form it was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// `true` / `false`.
    Bool(bool),
    /// `0` / non-zero.
    Int(i64),
}

impl Flag {
    /// Whether the flag is on.
    #[must_use]
    pub const fn is_set(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(n) => n != 0,
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::Int(0)
    }
}

/// A colouring-page request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourInRequest {
    /// Image as a base64 data URL (or a bare base64 payload).
    pub image: String,

    /// Blur window size in pixels; `0` and `1` disable the blur.
    #[serde(default)]
    pub blur_val: i32,

    /// Linear contrast, `(-127, 127)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_val: Option<i32>,

    /// Linear brightness offset, `[-127, 127]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brighten_val: Option<i32>,

    /// Lightening gamma, greater than 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_val: Option<f32>,

    /// Darkening gamma, in `(0, 1)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_val: Option<f32>,

    /// Sharpen the finished outline.
    #[serde(default)]
    pub sharpen: Flag,
}

impl ColourInRequest {
    /// Tone policy selected by the populated fields.
    ///
    /// A missing partner field of the linear policy defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::ConflictingTone`] if fields of both
    /// policies are populated.
    pub fn tone(&self) -> Result<ToneParameters, RequestError> {
        let linear = self.contrast_val.is_some() || self.brighten_val.is_some();
        let gamma = self.light_val.is_some() || self.dark_val.is_some();
        match (linear, gamma) {
            (true, true) => Err(RequestError::ConflictingTone),
            (true, false) => Ok(ToneParameters::Linear {
                contrast: self.contrast_val.unwrap_or(0),
                brightness: self.brighten_val.unwrap_or(0),
            }),
            (false, true) => Ok(ToneParameters::Gamma {
                lighten: self.light_val,
                darken: self.dark_val,
            }),
            (false, false) => Ok(ToneParameters::None),
        }
    }

    /// Blur radius for a `blur_val` window size.
    ///
    /// A window of `n` pixels maps to radius `n / 2`, so odd sizes are
    /// exact and even sizes round up to the next odd window. Negative
    /// sizes stay negative and are rejected by the pipeline.
    #[must_use]
    pub const fn blur_radius(&self) -> i32 {
        self.blur_val.div_euclid(2)
    }

    /// Pipeline parameters for this request, taking the output format
    /// and pixel ceiling from `base`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::ConflictingTone`] if fields of both tone
    /// policies are populated. Range checks are left to the pipeline.
    pub fn to_parameters(
        &self,
        base: &PipelineParameters,
    ) -> Result<PipelineParameters, RequestError> {
        Ok(PipelineParameters {
            blur_radius: self.blur_radius(),
            sharpen: self.sharpen.is_set(),
            tone: self.tone()?,
            ..base.clone()
        })
    }
}

/// A colouring-page response: the request echoed back plus the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourInResponse {
    /// The request fields, unchanged.
    #[serde(flatten)]
    pub request: ColourInRequest,

    /// The line drawing as a base64 data URL.
    pub colour_in: String,
}
