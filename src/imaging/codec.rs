//! Decode uploaded bytes and encode edited rasters.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed from content) |
//! | Normalize to RGB | `DynamicImage::to_rgb8` (alpha dropped, palettes expanded) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` (default quality 95) |
//! | Encode → PNG | `PngEncoder` |
//! | Thumbnail | `imageops::resize` with `Lanczos3`, fit-inside, never upscaled |

use super::calculations::calculate_fit_dimensions;
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("{0} encode failed: {1}")]
    Encode(&'static str, String),
}

const UPLOAD_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    UPLOAD_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions that have a decoder compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Decode encoded bytes into an image.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    let img = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    let (width, height) = (img.width(), img.height());
    debug!(width, height, color = ?img.color(), "Decoded");
    Ok(img)
}

/// Decode and normalize to 3-channel 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, CodecError> {
    decode(bytes).map(|img| img.to_rgb8())
}

/// Encode an RGB raster.
pub fn encode(
    img: &RgbImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
            img.write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode("JPEG", e.to_string()))?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode("PNG", e.to_string()))?;
        }
    }
    Ok(buf)
}

/// Shrink to fit within `bounds`, keeping the aspect ratio.
pub fn thumbnail(img: &DynamicImage, bounds: (u32, u32)) -> RgbImage {
    let rgb = img.to_rgb8();
    let (w, h) = calculate_fit_dimensions(rgb.dimensions(), bounds);
    if (w, h) == rgb.dimensions() {
        return rgb;
    }
    image::imageops::resize(&rgb, w, h, FilterType::Lanczos3)
}
