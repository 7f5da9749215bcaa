//! Pure Rust filter backend.
//!
//! ## Operation mapping
//!
//! | Op | Implementation |
//! |---|---|
//! | contrast, brightness, saturation, sharpness | [`enhance`](super::enhance) blend against a degenerate image |
//! | edge-enhance, edge-enhance-strong, smooth-strong | [`filters::convolve`](super::filters::convolve) with a fixed kernel |
//! | median-denoise | `imageproc::filter::median_filter` |
//! | gaussian-blur | `imageproc::filter::gaussian_blur_f32` (radius ≤ 0 is the identity) |
//! | unsharp-mask | [`filters::unsharp_mask`](super::filters::unsharp_mask) |
//! | focus-blend | [`compositor::focus_blend`](super::compositor::focus_blend) |
//!
//! Median and unsharp mask need at least one pixel to sample; they reject
//! empty rasters. Every other op passes an empty raster through.

use super::backend::{FilterBackend, FilterError};
use super::filters::{EDGE_ENHANCE, EDGE_ENHANCE_STRONG, SMOOTH_STRONG};
use super::params::FilterOp;
use super::{compositor, enhance, filters};
use image::RgbImage;
use tracing::{debug, instrument};

/// Pure Rust backend built on `image` buffers and `imageproc`.
///
/// See the [module docs](self) for the op-to-function mapping.
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

fn finite(name: &'static str, value: f32) -> Result<f32, FilterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FilterError::InvalidParameter { name, value })
    }
}

fn non_empty(op: &FilterOp, image: &RgbImage) -> Result<(), FilterError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(FilterError::EmptyImage {
            op: op.name(),
            width,
            height,
        });
    }
    Ok(())
}

impl FilterBackend for RustBackend {
    #[instrument(level = "debug", skip(self, image), fields(op = %op))]
    fn apply(&self, image: RgbImage, op: &FilterOp) -> Result<RgbImage, FilterError> {
        let out = match *op {
            FilterOp::Contrast(f) => enhance::contrast(&image, finite("contrast", f)?),
            FilterOp::Brightness(f) => enhance::brightness(&image, finite("brightness", f)?),
            FilterOp::Sharpness(f) => enhance::sharpness(&image, finite("sharpness", f)?),
            FilterOp::Saturation(f) => enhance::saturation(&image, finite("saturation", f)?),
            FilterOp::GaussianBlur { radius } => {
                filters::gaussian_blur(&image, finite("radius", radius)?)
            }
            FilterOp::MedianDenoise { size } => {
                non_empty(op, &image)?;
                if size % 2 == 0 {
                    return Err(FilterError::InvalidParameter {
                        name: "size",
                        value: size as f32,
                    });
                }
                filters::median_denoise(&image, size)
            }
            FilterOp::EdgeEnhance => filters::convolve(&image, &EDGE_ENHANCE),
            FilterOp::EdgeEnhanceStrong => filters::convolve(&image, &EDGE_ENHANCE_STRONG),
            FilterOp::SmoothStrong => filters::convolve(&image, &SMOOTH_STRONG),
            FilterOp::UnsharpMask(mask) => {
                non_empty(op, &image)?;
                finite("radius", mask.radius)?;
                filters::unsharp_mask(&image, &mask)
            }
            FilterOp::FocusBlend { blur_radius } => {
                compositor::focus_blend(&image, finite("blur_radius", blur_radius)?)
            }
        };
        let (width, height) = out.dimensions();
        debug!(width, height, "Step applied");
        Ok(out)
    }
}
