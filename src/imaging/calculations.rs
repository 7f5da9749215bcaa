//! Pure calculation functions for pixel math and image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// ITU-R 601-2 luma of an RGB pixel, as an 8-bit value.
///
/// Fixed-point with rounding: `(19595·r + 38470·g + 7471·b + 2¹⁵) >> 16`.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Interpolate (or extrapolate) from `degenerate` toward `value`.
///
/// `factor = 0` yields `degenerate`, `factor = 1` yields `value` exactly.
/// Results are clipped to `0..=255` and truncated toward zero.
#[inline]
pub fn blend_channel(degenerate: u8, value: u8, factor: f32) -> u8 {
    let out = degenerate as f32 + factor * (value as f32 - degenerate as f32);
    if out <= 0.0 {
        0
    } else if out >= 255.0 {
        255
    } else {
        out as u8
    }
}

/// Mix `original` over `blurred` with `mask` as the original's weight.
///
/// `mask = 0` gives `blurred`, `mask = 255` gives `original`.
#[inline]
pub fn composite_channel(original: u8, blurred: u8, mask: u8) -> u8 {
    let m = mask as u32;
    ((original as u32 * m + blurred as u32 * (255 - m) + 127) / 255) as u8
}

/// Center and falloff radius of the background region mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskGeometry {
    pub center_x: u32,
    pub center_y: u32,
    /// `min(width, height) / 3`, integer division.
    pub max_radius: u32,
}

impl MaskGeometry {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        Self {
            center_x: width / 2,
            center_y: height / 2,
            max_radius: width.min(height) / 3,
        }
    }
}

/// Region mask weight at `(x, y)`.
///
/// Inside `max_radius` the weight rises linearly from 0 at the center,
/// floored; everywhere else it is 255. A zero radius never enters the
/// ramp branch, so there is no division by zero.
#[inline]
pub fn mask_value(x: u32, y: u32, geometry: &MaskGeometry) -> u8 {
    let dx = x as f64 - geometry.center_x as f64;
    let dy = y as f64 - geometry.center_y as f64;
    let distance = (dx * dx + dy * dy).sqrt();
    let max_radius = geometry.max_radius as f64;
    if distance < max_radius {
        (255.0 * (distance / max_radius)) as u8
    } else {
        255
    }
}

/// Calculate dimensions that fit within `bounds` while keeping the aspect ratio.
///
/// Never upscales: a source already inside the box is returned unchanged.
/// Each side is at least 1 pixel.
///
/// # Examples
/// ```
/// # use snapedit::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((800, 600), (200, 200)), (200, 150));
/// assert_eq!(calculate_fit_dimensions((100, 50), (200, 200)), (100, 50));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}
