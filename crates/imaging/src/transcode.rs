use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{GenericImageView, RgbImage};
use tracing::{debug, warn};

use stylecast_core::error::{Error, Result};

use crate::data_url::{encode_data_url, parse_data_url, sniff_mime};

/// Where an image comes from: a remote URL, an embedded data URL, or
/// bytes the host already read (e.g. a user-selected file).
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    DataUrl(String),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("data:") {
            ImageSource::DataUrl(input.to_string())
        } else {
            ImageSource::Url(input.to_string())
        }
    }
}

/// Unsharp-mask parameters applied after the high-quality resize.
/// `amount` is a percentage of the high-frequency delta added back;
/// pixels whose delta stays under `threshold` are left untouched.
#[derive(Debug, Clone, Copy)]
pub struct Unsharp {
    pub amount: f32,
    pub radius: f32,
    pub threshold: i32,
}

impl Default for Unsharp {
    fn default() -> Self {
        Self {
            amount: 80.0,
            radius: 0.6,
            threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TranscodeOptions {
    pub max_dimension: u32,
    /// JPEG quality in 0..=1.
    pub quality: f32,
    /// When set, downscaling uses Lanczos3 plus this unsharp mask; when
    /// unset, plain bilinear resampling.
    pub sharpen: Option<Unsharp>,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            quality: 0.95,
            sharpen: Some(Unsharp::default()),
        }
    }
}

/// Fit `(width, height)` within `max_dimension` on the longer side,
/// preserving aspect ratio. Never upscales.
pub fn target_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    if width >= height {
        let new_height = (height as f64 / width as f64 * max_dimension as f64).round() as u32;
        (max_dimension, new_height.max(1))
    } else {
        let new_width = (width as f64 / height as f64 * max_dimension as f64).round() as u32;
        (new_width.max(1), max_dimension)
    }
}

fn unsharp_mask(img: &RgbImage, params: &Unsharp) -> RgbImage {
    let blurred = imageops::blur(img, params.radius);
    let amount = params.amount / 100.0;
    let threshold = params.threshold as f32;
    let mut out = img.clone();
    for (pixel, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let orig = pixel.0[c] as f32;
            let diff = orig - soft.0[c] as f32;
            if diff.abs() >= threshold {
                pixel.0[c] = (orig + amount * diff).clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Decode, bound to `max_dimension`, and re-encode as a JPEG data URL at
/// the requested quality. If JPEG encoding itself fails the original
/// bytes are passed through unchanged under their sniffed MIME type.
pub fn transcode(bytes: &[u8], opts: &TranscodeOptions) -> Result<String> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::Image(format!("failed to decode image: {}", e)))?;
    let (width, height) = decoded.dimensions();
    let (target_width, target_height) = target_size(width, height, opts.max_dimension);

    let rgb = if (target_width, target_height) != (width, height) {
        debug!(
            from = %format!("{}x{}", width, height),
            to = %format!("{}x{}", target_width, target_height),
            "Downscaling image"
        );
        match &opts.sharpen {
            Some(params) => {
                let resized = decoded
                    .resize_exact(target_width, target_height, FilterType::Lanczos3)
                    .to_rgb8();
                unsharp_mask(&resized, params)
            }
            None => decoded
                .resize_exact(target_width, target_height, FilterType::Triangle)
                .to_rgb8(),
        }
    } else {
        decoded.to_rgb8()
    };

    let quality = (opts.quality.clamp(0.0, 1.0) * 100.0).round() as u8;
    let mut buf = Vec::new();
    match JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb) {
        Ok(()) => Ok(encode_data_url("image/jpeg", &buf)),
        Err(e) => {
            warn!(error = %e, "JPEG encode failed, passing original bytes through");
            Ok(encode_data_url(sniff_mime(bytes), bytes))
        }
    }
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("failed to fetch image from {}: {}", url, e)))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Transport(format!(
            "failed to fetch image: {} from {}",
            status, url
        )));
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.is_empty() && !content_type.starts_with("image/") {
        return Err(Error::Image(format!(
            "fetched content is not an image: {} from {}",
            content_type, url
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("failed to read image body from {}: {}", url, e)))?;
    Ok(bytes.to_vec())
}

/// Resolve a source to raw bytes, then transcode. No internal retries;
/// every failure is surfaced to the caller.
pub async fn transcode_source(
    client: &reqwest::Client,
    source: &ImageSource,
    opts: &TranscodeOptions,
) -> Result<String> {
    let bytes = match source {
        ImageSource::Url(url) => fetch_url(client, url).await?,
        ImageSource::DataUrl(url) => parse_data_url(url)?.1,
        ImageSource::Bytes(bytes) => bytes.clone(),
    };
    transcode(&bytes, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 90, 200]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn decoded_dimensions(data_url: &str) -> (String, u32, u32) {
        let (mime, bytes) = parse_data_url(data_url).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        (mime, img.width(), img.height())
    }

    #[test]
    fn target_size_never_upscales() {
        assert_eq!(target_size(800, 600, 2000), (800, 600));
        assert_eq!(target_size(2000, 2000, 2000), (2000, 2000));
    }

    #[test]
    fn target_size_bounds_longer_side() {
        assert_eq!(target_size(4000, 2000, 2000), (2000, 1000));
        assert_eq!(target_size(1500, 3000, 2000), (1000, 2000));
        // Rounding: 3333x2500 -> ratio 0.75, longer side to 2000
        assert_eq!(target_size(3333, 2500, 2000), (2000, 1500));
    }

    #[test]
    fn small_image_keeps_dimensions() {
        let out = transcode(&png_bytes(640, 480), &TranscodeOptions::default()).unwrap();
        let (mime, w, h) = decoded_dimensions(&out);
        assert_eq!(mime, "image/jpeg");
        assert_eq!((w, h), (640, 480));
    }

    #[test]
    fn large_image_is_bounded() {
        let opts = TranscodeOptions {
            max_dimension: 100,
            ..TranscodeOptions::default()
        };
        let out = transcode(&png_bytes(400, 300), &opts).unwrap();
        let (mime, w, h) = decoded_dimensions(&out);
        assert_eq!(mime, "image/jpeg");
        assert_eq!((w, h), (100, 75));
    }

    #[test]
    fn bilinear_path_matches_dimensions() {
        let opts = TranscodeOptions {
            max_dimension: 50,
            sharpen: None,
            ..TranscodeOptions::default()
        };
        let out = transcode(&png_bytes(200, 100), &opts).unwrap();
        let (_, w, h) = decoded_dimensions(&out);
        assert_eq!((w, h), (50, 25));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = transcode(b"definitely not an image", &TranscodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[tokio::test]
    async fn data_url_source_is_transcoded() {
        let data_url = encode_data_url("image/png", &png_bytes(30, 20));
        let client = reqwest::Client::new();
        let out = transcode_source(
            &client,
            &ImageSource::parse(&data_url),
            &TranscodeOptions::default(),
        )
        .await
        .unwrap();
        let (mime, w, h) = decoded_dimensions(&out);
        assert_eq!(mime, "image/jpeg");
        assert_eq!((w, h), (30, 20));
    }
}
