//! Base64 transport encoding for the contents API.
//!
//! GitHub stores file bodies base64-encoded. Encoding goes through the raw
//! UTF-8 bytes so multibyte text survives the round trip, and GitHub
//! line-wraps the payload it returns, so decoding strips whitespace first.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::GitHubError;

/// Encode text for a contents API request body.
pub fn encode_base64(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a contents API base64 payload back to text.
pub fn decode_base64(data: &str) -> Result<String, GitHubError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GitHubError::Encoding(format!("invalid base64: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| GitHubError::Encoding(format!("invalid UTF-8: {}", e)))
}
