//! Pipeline dispatcher: edit request in, edited raster out.
//!
//! ```text
//! edit_type ──parse──▶ EditType ──chain::plan(f)──▶ [FilterOp; n]
//!                                                     │
//! image ──to_rgb8──▶ RgbImage ──backend.apply(op₁)──▶ … ──apply(opₙ)──▶ RgbImage
//! ```
//!
//! The edit type is parsed before anything else, so an unknown type fails
//! with zero filter steps run and nothing decoded or encoded. Intensity is
//! not clamped: out-of-range values just produce out-of-range coefficients,
//! and the enhancers clip each pixel to 0–255.
//!
//! A step failure aborts the whole invocation and the half-edited raster is
//! dropped. There are no retries. Cancellation is checked between steps,
//! never inside one.

use crate::chain;
use crate::imaging::{
    CodecError, FilterBackend, FilterError, OutputFormat, Quality, RustBackend, codec,
};
use crate::request::{EditRequest, UnsupportedEditType};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unsupported edit type: {0:?}")]
    UnsupportedEditType(String),
    #[error("decode failed: {0}")]
    Decode(#[source] CodecError),
    #[error("{step} step failed: {source}")]
    FilterStep {
        step: &'static str,
        #[source]
        source: FilterError,
    },
    #[error("encode failed: {0}")]
    Encode(#[source] CodecError),
    #[error("cancelled after {completed} step(s)")]
    Cancelled {
        completed: usize,
    },
}

impl From<UnsupportedEditType> for PipelineError {
    fn from(err: UnsupportedEditType) -> Self {
        PipelineError::UnsupportedEditType(err.0)
    }
}

/// Cooperative cancellation flag, shared between the caller and a running edit.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Apply `edit_type` at `intensity` to `image` with the pure Rust backend.
///
/// Any color mode is normalized to 8-bit RGB first; alpha is dropped.
///
/// ```
/// use image::{DynamicImage, RgbImage};
///
/// let img = DynamicImage::ImageRgb8(RgbImage::new(8, 6));
/// let out = snapedit::pipeline::process(&img, "enhance", 50).unwrap();
/// assert_eq!(out.dimensions(), (8, 6));
///
/// assert!(snapedit::pipeline::process(&img, "sepia", 50).is_err());
/// ```
pub fn process(
    image: &DynamicImage,
    edit_type: &str,
    intensity: i32,
) -> Result<RgbImage, PipelineError> {
    let request = EditRequest::parse(edit_type, intensity)?;
    process_request(
        &RustBackend::new(),
        image.to_rgb8(),
        &request,
        &CancelToken::new(),
    )
}

/// Run the request's chain through `backend`, one step at a time.
#[instrument(
    level = "debug",
    skip(backend, image, cancel),
    fields(edit = %request.edit_type, intensity = %request.intensity)
)]
pub fn process_request(
    backend: &impl FilterBackend,
    image: RgbImage,
    request: &EditRequest,
    cancel: &CancelToken,
) -> Result<RgbImage, PipelineError> {
    if !request.intensity.in_range() {
        warn!(
            intensity = request.intensity.value(),
            "Intensity outside 0..=100; coefficients are not clamped"
        );
    }

    let steps = chain::plan(request.edit_type, request.factor());
    debug!(steps = steps.len(), "Planned chain");

    let mut current = image;
    for (completed, op) in steps.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { completed });
        }
        current = backend
            .apply(current, op)
            .map_err(|source| PipelineError::FilterStep {
                step: op.name(),
                source,
            })?;
    }
    Ok(current)
}

/// Bytes in, bytes out: parse, decode, edit, encode.
pub fn process_bytes(
    bytes: &[u8],
    edit_type: &str,
    intensity: i32,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, PipelineError> {
    let request = EditRequest::parse(edit_type, intensity)?;
    let image = codec::decode_rgb(bytes).map_err(PipelineError::Decode)?;
    let edited = process_request(&RustBackend::new(), image, &request, &CancelToken::new())?;
    codec::encode(&edited, format, quality).map_err(PipelineError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::RecordingBackend;
    use crate::imaging::filters::gaussian_blur;
    use crate::request::EditType;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 4 % 256) as u8, (y * 4 % 256) as u8, 100])
        })
    }

    fn checkerboard(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([230, 230, 230])
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    fn mean_abs_diff(a: &RgbImage, b: &RgbImage) -> f64 {
        let total: u64 = a
            .as_raw()
            .iter()
            .zip(b.as_raw())
            .map(|(x, y)| x.abs_diff(*y) as u64)
            .sum();
        total as f64 / a.as_raw().len() as f64
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn every_chain_preserves_dimensions() {
        let img = DynamicImage::ImageRgb8(gradient(23, 17));
        for edit in EditType::ALL {
            for intensity in [0, 40, 41, 50, 51, 70, 71, 100] {
                let out = process(&img, edit.as_str(), intensity).unwrap();
                assert_eq!(out.dimensions(), (23, 17), "{edit} at {intensity}");
            }
        }
    }

    #[test]
    fn rgba_input_is_normalized() {
        let rgba = image::RgbaImage::from_pixel(5, 4, image::Rgba([10, 20, 30, 128]));
        let out = process(&DynamicImage::ImageRgba8(rgba), "colorize", 30).unwrap();
        assert_eq!(out.dimensions(), (5, 4));
    }

    #[test]
    fn zero_intensity_is_near_identity() {
        let img = gradient(32, 32);
        let dynamic = DynamicImage::ImageRgb8(img.clone());
        for edit in ["enhance", "colorize", "retouch", "restore"] {
            let out = process(&dynamic, edit, 0).unwrap();
            let diff = mean_abs_diff(&img, &out);
            assert!(diff <= 1.0, "{edit} drifted by {diff}");
        }
    }

    #[test]
    fn enhance_changes_the_image() {
        let img = gradient(32, 32);
        let out = process(&DynamicImage::ImageRgb8(img.clone()), "enhance", 50).unwrap();
        assert_ne!(out, img);
    }

    #[test]
    fn enhance_is_not_idempotent() {
        let img = DynamicImage::ImageRgb8(gradient(32, 32));
        let once = process(&img, "enhance", 80).unwrap();
        let twice = process(&DynamicImage::ImageRgb8(once.clone()), "enhance", 80).unwrap();
        assert_ne!(once, twice);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn unknown_edit_type_is_rejected() {
        let img = DynamicImage::ImageRgb8(gradient(4, 4));
        let err = process(&img, "sepia", 50).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedEditType(ref s) if s == "sepia"));
        assert_eq!(err.to_string(), "unsupported edit type: \"sepia\"");
    }

    #[test]
    fn edit_type_is_checked_before_decode() {
        let err = process_bytes(
            b"not an image",
            "sepia",
            50,
            OutputFormat::Jpeg,
            Quality::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedEditType(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = process_bytes(
            b"not an image",
            "enhance",
            50,
            OutputFormat::Jpeg,
            Quality::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn failing_step_names_the_step() {
        let backend = RecordingBackend::failing_on("sharpness");
        let request = EditRequest::new(EditType::Enhance, 50);
        let cancel = CancelToken::new();
        let err = process_request(&backend, gradient(4, 4), &request, &cancel).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FilterStep {
                step: "sharpness",
                ..
            }
        ));
        // Nothing after the failing step runs
        assert_eq!(
            backend.step_names(),
            vec!["contrast", "brightness", "sharpness"]
        );
    }

    #[test]
    fn restore_on_empty_image_fails_at_median() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 7));
        let err = process(&img, "restore", 60).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FilterStep {
                step: "median-denoise",
                source: FilterError::EmptyImage { .. }
            }
        ));
    }

    #[test]
    fn background_on_empty_image_succeeds() {
        for (w, h) in [(0, 0), (0, 9), (9, 0)] {
            let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            let out = process(&img, "background", 40).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    // =========================================================================
    // Step sequencing (recording backend)
    // =========================================================================

    #[test]
    fn restore_threshold_controls_unsharp() {
        let cancel = CancelToken::new();
        let backend = RecordingBackend::new();
        let request = EditRequest::new(EditType::Restore, 50);
        process_request(&backend, gradient(4, 4), &request, &cancel).unwrap();
        assert_eq!(backend.step_names().len(), 3);

        let backend = RecordingBackend::new();
        let request = EditRequest::new(EditType::Restore, 51);
        process_request(&backend, gradient(4, 4), &request, &cancel).unwrap();
        assert_eq!(backend.step_names().last(), Some(&"unsharp-mask"));
    }

    #[test]
    fn style_branches_at_seventy() {
        let cancel = CancelToken::new();
        let backend = RecordingBackend::new();
        let request = EditRequest::new(EditType::Style, 71);
        process_request(&backend, gradient(4, 4), &request, &cancel).unwrap();
        assert_eq!(
            backend.step_names(),
            vec!["edge-enhance-strong", "saturation"]
        );

        let backend = RecordingBackend::new();
        let request = EditRequest::new(EditType::Style, 70);
        process_request(&backend, gradient(4, 4), &request, &cancel).unwrap();
        assert_eq!(backend.step_names(), vec!["edge-enhance", "contrast"]);
    }

    #[test]
    fn cancelled_token_stops_before_first_step() {
        let backend = RecordingBackend::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = process_request(
            &backend,
            gradient(4, 4),
            &EditRequest::new(EditType::Enhance, 50),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { completed: 0 }));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    // =========================================================================
    // Background focus property
    // =========================================================================

    #[test]
    fn background_blurs_center_and_keeps_corner() {
        let img = checkerboard(100);
        let out = process(&DynamicImage::ImageRgb8(img.clone()), "background", 40).unwrap();
        let blurred = gaussian_blur(&img, 2.0);

        assert_eq!(out.get_pixel(50, 50), blurred.get_pixel(50, 50));
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(0, 0));
        assert_eq!(out.get_pixel(99, 99), img.get_pixel(99, 99));
    }

    #[test]
    fn process_bytes_roundtrips_png() {
        let img = gradient(12, 9);
        let png = codec::encode(&img, OutputFormat::Png, Quality::default()).unwrap();
        let quality = Quality::default();
        let out = process_bytes(&png, "style", 30, OutputFormat::Png, quality).unwrap();
        let decoded = codec::decode_rgb(&out).unwrap();
        assert_eq!(decoded.dimensions(), (12, 9));
    }
}
