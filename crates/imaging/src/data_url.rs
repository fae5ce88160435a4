use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use stylecast_core::error::{Error, Result};

/// Decode a `data:<mime>;base64,<payload>` URL into its MIME type and
/// raw bytes. Non-base64 data URLs are rejected; nothing in the pipeline
/// produces them.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::Image("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Image("malformed data URL: missing comma".to_string()))?;
    let mime = match header.strip_suffix(";base64") {
        Some(mime) => mime,
        None => {
            return Err(Error::Image(format!(
                "unsupported data URL encoding: {}",
                header
            )))
        }
    };
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| Error::Image(format!("invalid base64 in data URL: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Best-effort MIME sniff from magic bytes, for the pass-through fallback
/// where the original bytes are returned unencoded.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        _ => "application/octet-stream",
    }
}
