//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy at the configured quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Re-compress PNG | `image::codecs::png::PngEncoder` (best, adaptive) |
//! | Re-compress JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Re-compress SVG | [`optimize_svg`] text pass |
//!
//! Re-compression never grows a file: when the encoder's output is not
//! smaller than the source, the source bytes are returned unchanged.

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, OutputFormat, Quality};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Raster formats with decoders compiled in.
const RASTER_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Whether `path` is a raster image the backend can convert to next-gen formats.
pub fn is_convertible(path: &Path) -> bool {
    let ext = extension(path);
    RASTER_CANDIDATES
        .iter()
        .any(|(candidate, fmt)| *candidate == ext && fmt.reading_enabled())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode as lossy WebP via libwebp.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, quality.value() as f32)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {:?}", e)))?;
    Ok(encoded.to_vec())
}

/// Encode as AVIF using rav1e (speed=6 for reasonable throughput).
fn encode_avif(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let encoder = AvifEncoder::new_with_speed_quality(&mut buf, 6, quality.value() as u8);
    rgba.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))?;
    Ok(buf)
}

fn recompress(path: &Path, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let original = std::fs::read(path)?;
    let candidate = match extension(path).as_str() {
        "png" => {
            let img = load_image(path)?;
            let mut buf = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
            buf
        }
        "jpg" | "jpeg" => {
            let img = load_image(path)?;
            let mut buf = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| {
                    BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e))
                })?;
            buf
        }
        "svg" => {
            let text = String::from_utf8_lossy(&original);
            optimize_svg(&text).into_bytes()
        }
        _ => return Ok(original),
    };

    if candidate.len() < original.len() {
        Ok(candidate)
    } else {
        Ok(original)
    }
}

/// Strip comments, the XML prolog's trailing whitespace, and whitespace-only
/// runs between tags that contain a line break.
pub fn optimize_svg(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text.trim();

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let mut collapsed = String::with_capacity(out.len());
    let mut chars = out.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        collapsed.push(c);
        if c != '>' {
            continue;
        }
        let tail = &out[i + 1..];
        let ws_len = tail.len() - tail.trim_start().len();
        let ws = &tail[..ws_len];
        if ws_len > 0 && ws.contains('\n') && tail[ws_len..].starts_with('<') {
            while chars.peek().is_some_and(|(j, _)| *j <= i + ws_len) {
                chars.next();
            }
        }
    }
    collapsed
}

impl ImageBackend for RustBackend {
    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        match params.format {
            OutputFormat::WebP => encode_webp(&load_image(&params.source)?, params.quality),
            OutputFormat::Avif => encode_avif(&load_image(&params.source)?, params.quality),
            OutputFormat::Optimized => recompress(&params.source, params.quality),
        }
    }
}
