//! Request-layer errors and their HTTP-style status codes.

use lineart_pipeline::PipelineError;
use serde::Serialize;
use thiserror::Error;

/// Detail message of the single generic failure the legacy service
/// returned for every error.
pub const LEGACY_DETAIL: &str = "Something went wrong";

/// Errors raised while turning a request into a response.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request body is not a valid request document.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The `image` field starts like a data URL but has no payload.
    #[error("image field is not a valid data URL")]
    MalformedDataUrl,

    /// The data URL uses an encoding other than base64.
    #[error("unsupported data URL encoding in {0:?}, expected base64")]
    UnsupportedEncoding(String),

    /// The image payload is not valid base64.
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Both linear and gamma tone fields were populated.
    #[error(
        "linear tone fields (contrast_val, brighten_val) and gamma tone fields \
         (light_val, dark_val) cannot be combined"
    )]
    ConflictingTone,

    /// The pipeline rejected the image or the parameters.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl RequestError {
    /// Status code distinguishing bad input (400) from internal
    /// failures (500).
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Pipeline(err) if !err.kind().is_client_error() => 500,
            _ => 400,
        }
    }

    /// Status code of the legacy service: 500 for every failure.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn legacy_status(&self) -> u16 {
        500
    }

    /// Error body for this failure.
    ///
    /// With `legacy` set the detail collapses to [`LEGACY_DETAIL`].
    #[must_use]
    pub fn to_body(&self, legacy: bool) -> ErrorBody {
        if legacy {
            ErrorBody {
                status: self.legacy_status(),
                detail: LEGACY_DETAIL.to_owned(),
            }
        } else {
            ErrorBody {
                status: self.status(),
                detail: self.to_string(),
            }
        }
    }
}

/// Serializable failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// HTTP-style status code.
    pub status: u16,
    /// Human-readable explanation.
    pub detail: String,
}
