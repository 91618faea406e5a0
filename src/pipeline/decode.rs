//! Payload decoding: base64 text from the request body → document bytes.
//!
//! Browsers and scripts produce base64 in slightly different shapes: line
//! wrapped at 76 columns, with a `data:` URI prefix from `FileReader`, or
//! with the trailing `=` padding dropped. All of those are accepted; any
//! character outside the standard alphabet is a [`Docx2MdError::Decode`].

use crate::error::Docx2MdError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::debug;

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 document payload.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, Docx2MdError> {
    let body = strip_data_uri(payload.trim());
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| Docx2MdError::Decode(e.to_string()))?;

    if bytes.is_empty() {
        return Err(Docx2MdError::Decode("payload decoded to zero bytes".into()));
    }

    debug!("Decoded payload: {} base64 chars → {} bytes", compact.len(), bytes.len());
    Ok(bytes)
}

/// Drop a leading `data:<mime>;base64,` prefix if present.
fn strip_data_uri(s: &str) -> &str {
    if s.starts_with("data:") {
        if let Some((header, rest)) = s.split_once(',') {
            if header.ends_with(";base64") {
                return rest;
            }
        }
    }
    s
}
