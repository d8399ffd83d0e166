//! lineart-request: JSON request layer for the line-art pipeline
//! (sans-IO).
//!
//! Translates a colouring-page request document into a pipeline call and
//! back: the `image` field is unwrapped from its base64 data URL, the
//! tone policy is picked from whichever tone fields are populated, and
//! the result is returned as a data URL alongside an echo of the
//! request. Failures carry a status code separating bad input (400) from
//! internal failures (500), with the legacy "500 for everything" mapping
//! still available.
//!
//! No HTTP server lives here; a host framework (or the `lineart` CLI)
//! feeds request bodies in and writes responses out.

pub mod data_url;
pub mod error;
pub mod schema;

use lineart_pipeline::{PipelineError, PipelineParameters};
use serde::Serialize;

pub use data_url::DataUrl;
pub use error::{ErrorBody, LEGACY_DETAIL, RequestError};
pub use schema::{ColourInRequest, ColourInResponse, Flag};

/// Parse a JSON request body.
///
/// # Errors
///
/// Returns [`RequestError::MalformedBody`] if the body is not a valid
/// request document.
pub fn parse_request(body: &str) -> Result<ColourInRequest, RequestError> {
    Ok(serde_json::from_str(body)?)
}

/// Handle a request with default settings (PNG output, default pixel
/// ceiling).
///
/// # Errors
///
/// See [`handle_with`].
pub fn handle(request: ColourInRequest) -> Result<ColourInResponse, RequestError> {
    handle_with(request, &PipelineParameters::default())
}

/// Handle a request, taking the output format and pixel ceiling from
/// `base`.
///
/// The response data URL carries the MIME type of the produced image.
///
/// # Errors
///
/// Returns a [`RequestError`] if the tone fields conflict, a parameter
/// is out of range, the image field cannot be unwrapped, or the pipeline
/// fails. Parameters are checked before the image field is touched.
pub fn handle_with(
    request: ColourInRequest,
    base: &PipelineParameters,
) -> Result<ColourInResponse, RequestError> {
    let params = request.to_parameters(base)?;
    params.validate().map_err(PipelineError::from)?;
    let url = DataUrl::parse(&request.image)?;
    let bytes = url.decode()?;

    tracing::debug!(
        media_type = url.media_type.unwrap_or("unknown"),
        input_bytes = bytes.len(),
        tone = params.tone.policy_name(),
        blur_radius = params.blur_radius,
        sharpen = params.sharpen,
        "handling colour-in request"
    );

    let output = lineart_pipeline::generate_line_art(&bytes, &params)?;
    let colour_in = data_url::encode(params.output_format.mime_type(), &output);

    Ok(ColourInResponse { request, colour_in })
}

/// Handle a JSON body and produce a JSON body plus status code.
///
/// Never fails: errors become an [`ErrorBody`] document. `legacy`
/// selects the single generic 500 failure of the legacy service.
#[must_use]
pub fn handle_json(body: &str, base: &PipelineParameters, legacy: bool) -> (u16, String) {
    match parse_request(body).and_then(|request| handle_with(request, base)) {
        Ok(response) => render(200, &response, legacy),
        Err(err) => {
            tracing::warn!(error = %err, status = err.status(), "request failed");
            let body = err.to_body(legacy);
            render(body.status, &body, legacy)
        }
    }
}

/// Serialize `document`, falling back to a 500 [`ErrorBody`] if that
/// fails.
fn render<T: Serialize>(status: u16, document: &T, legacy: bool) -> (u16, String) {
    match serde_json::to_string(document) {
        Ok(json) => (status, json),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response");
            let detail = if legacy {
                LEGACY_DETAIL.to_owned()
            } else {
                format!("failed to serialize response: {err}")
            };
            let body = serde_json::json!({ "status": 500, "detail": detail });
            (500, body.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn malformed_body_is_400() {
        let (status, body) = handle_json("{", &PipelineParameters::default(), false);
        assert_eq!(status, 400);
        assert!(body.contains("malformed request body"));
    }

    #[test]
    fn legacy_mode_collapses_to_500() {
        let (status, body) = handle_json("{", &PipelineParameters::default(), true);
        assert_eq!(status, 500);
        assert!(body.contains(LEGACY_DETAIL));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no JSON form"))
        }
    }

    #[test]
    fn serialization_failure_becomes_500_body() {
        let (status, body) = render(200, &Unserializable, false);
        assert_eq!(status, 500);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], 500);
        assert!(
            value["detail"]
                .as_str()
                .unwrap()
                .contains("no JSON form")
        );

        let (status, body) = render(200, &Unserializable, true);
        assert_eq!(status, 500);
        assert!(body.contains(LEGACY_DETAIL));
    }

    #[test]
    fn parameter_errors_win_over_transport_errors() {
        let body = r#"{"image":"bad_image","blur_val":1,"light_val":-2.0}"#;
        let err = parse_request(body)
            .and_then(handle)
            .unwrap_err();
        assert!(
            matches!(
                err,
                RequestError::Pipeline(PipelineError::InvalidParameter(_))
            ),
            "{err}"
        );
    }

    #[test]
    fn missing_image_field_is_malformed() {
        assert!(matches!(
            parse_request(r#"{"blur_val":1}"#),
            Err(RequestError::MalformedBody(_))
        ));
    }
}
