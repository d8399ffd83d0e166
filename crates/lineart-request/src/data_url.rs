//! `data:` URL framing of image payloads.
//!
//! Browsers send images as `data:<mime>;base64,<payload>`. A bare base64
//! payload without the `data:` header is accepted too.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::RequestError;

/// A parsed image field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// MIME type from the header, `None` for a bare payload or an empty
    /// header.
    pub media_type: Option<&'a str>,
    /// Base64 text after the comma.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split an image field into header and payload.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MalformedDataUrl`] if a `data:` header has
    /// no comma, and [`RequestError::UnsupportedEncoding`] if the header
    /// does not declare base64.
    pub fn parse(field: &'a str) -> Result<Self, RequestError> {
        let field = field.trim();
        let Some(rest) = field.strip_prefix("data:") else {
            return Ok(Self {
                media_type: None,
                payload: field,
            });
        };
        let (header, payload) = rest
            .split_once(',')
            .ok_or(RequestError::MalformedDataUrl)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| RequestError::UnsupportedEncoding(header.to_owned()))?;
        Ok(Self {
            media_type: (!media_type.is_empty()).then_some(media_type),
            payload,
        })
    }

    /// Decode the base64 payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Base64`] if the payload is not valid
    /// standard base64.
    pub fn decode(&self) -> Result<Vec<u8>, RequestError> {
        Ok(BASE64.decode(self.payload)?)
    }
}

/// Format raw bytes as a base64 data URL.
#[must_use]
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", BASE64.encode(bytes))
}
