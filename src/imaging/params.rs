//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`chain`](crate::chain) table (which decides which
//! steps run and with which coefficients) and the
//! [`backend`](super::backend) (which does the pixel work). The split lets
//! tests swap in a recording backend without touching chain logic.
//!
//! ## Types
//!
//! - [`FilterOp`]: one concrete step with its coefficient already resolved.
//! - [`UnsharpMask`]: radius / percent / threshold for the sharpening step.
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`OutputFormat`]: JPEG for ordinary results, PNG when lossless output is wanted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Encoded output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Unsharp-mask parameters.
///
/// - `radius`: Gaussian blur radius of the subtracted copy
/// - `percent`: strength of the added detail (150 = 1.5× the difference)
/// - `threshold`: minimum per-channel difference that gets sharpened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub radius: f32,
    pub percent: u32,
    pub threshold: u8,
}

impl UnsharpMask {
    /// Detail recovery used by the `restore` chain.
    pub const fn restore() -> Self {
        Self {
            radius: 2.0,
            percent: 150,
            threshold: 3,
        }
    }
}

/// A single filter step with a resolved coefficient.
///
/// Factor enhancers use `1.0` as identity; values below `1.0` reduce the
/// effect and are legal. `FocusBlend` blurs at `blur_radius`, then blends
/// with the original through the radial region mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Contrast(f32),
    Brightness(f32),
    Sharpness(f32),
    Saturation(f32),
    GaussianBlur { radius: f32 },
    MedianDenoise { size: u32 },
    EdgeEnhance,
    EdgeEnhanceStrong,
    SmoothStrong,
    UnsharpMask(UnsharpMask),
    FocusBlend { blur_radius: f32 },
}

impl FilterOp {
    /// Stable step name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Sharpness(_) => "sharpness",
            FilterOp::Saturation(_) => "saturation",
            FilterOp::GaussianBlur { .. } => "gaussian-blur",
            FilterOp::MedianDenoise { .. } => "median-denoise",
            FilterOp::EdgeEnhance => "edge-enhance",
            FilterOp::EdgeEnhanceStrong => "edge-enhance-strong",
            FilterOp::SmoothStrong => "smooth-strong",
            FilterOp::UnsharpMask(_) => "unsharp-mask",
            FilterOp::FocusBlend { .. } => "focus-blend",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Contrast(v)
            | FilterOp::Brightness(v)
            | FilterOp::Sharpness(v)
            | FilterOp::Saturation(v) => write!(f, "{} x{:.3}", self.name(), v),
            FilterOp::GaussianBlur { radius } => write!(f, "{} r={:.2}", self.name(), radius),
            FilterOp::MedianDenoise { size } => write!(f, "{} {}x{}", self.name(), size, size),
            FilterOp::UnsharpMask(m) => write!(
                f,
                "{} r={} {}% t={}",
                self.name(),
                m.radius,
                m.percent,
                m.threshold
            ),
            FilterOp::FocusBlend { blur_radius } => {
                write!(f, "{} r={:.2}", self.name(), blur_radius)
            }
            FilterOp::EdgeEnhance | FilterOp::EdgeEnhanceStrong | FilterOp::SmoothStrong => {
                f.write_str(self.name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn restore_unsharp_values() {
        let m = UnsharpMask::restore();
        assert_eq!(m.radius, 2.0);
        assert_eq!(m.percent, 150);
        assert_eq!(m.threshold, 3);
    }

    #[test]
    fn op_display() {
        assert_eq!(FilterOp::Contrast(1.25).to_string(), "contrast x1.250");
        assert_eq!(
            FilterOp::MedianDenoise { size: 3 }.to_string(),
            "median-denoise 3x3"
        );
        assert_eq!(
            FilterOp::UnsharpMask(UnsharpMask::restore()).to_string(),
            "unsharp-mask r=2 150% t=3"
        );
        assert_eq!(FilterOp::SmoothStrong.to_string(), "smooth-strong");
    }

    #[test]
    fn output_format_extension() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg);
    }
}
