//! Inline `data:` URLs for generated artifacts.
//!
//! Finished clips are kept in memory and addressed through a base64 data
//! URL, so a record can be handed to any consumer without a file store.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;

/// MIME type of every clip returned by the generation API.
pub const VIDEO_MIME: &str = "video/mp4";

/// MIME type assumed for reference images when none is given.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Build a `data:<mime>;base64,<payload>` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL back into its MIME type and raw bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), CoreError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CoreError::Artifact("URL does not start with 'data:'".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::Artifact("Data URL has no payload separator".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CoreError::Artifact("Only base64 data URLs are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CoreError::Artifact(format!("Invalid base64 payload: {e}")))?;

    Ok((mime.to_string(), bytes))
}
