//! Factor enhancers: contrast, brightness, saturation, sharpness.
//!
//! Each enhancer builds a *degenerate* version of the image and moves every
//! channel along the line from the degenerate value to the source value:
//!
//! ```text
//! out = degenerate + factor · (source − degenerate)     clipped to 0..=255
//! ```
//!
//! | Enhancer | Degenerate image |
//! |---|---|
//! | contrast | flat gray at the rounded mean luma |
//! | brightness | black |
//! | saturation | per-pixel luma (grayscale) |
//! | sharpness | 3×3 smoothed copy |
//!
//! A factor of exactly `1.0` reproduces the source bit-for-bit; values below
//! `1.0` move toward the degenerate image, values above extrapolate away.

use super::calculations::{blend_channel, luma};
use super::filters::{SMOOTH, convolve};
use image::{Rgb, RgbImage};

fn blend_with(
    img: &RgbImage,
    factor: f32,
    degenerate: impl Fn(u32, u32, &Rgb<u8>) -> [u8; 3],
) -> RgbImage {
    let mut out = img.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let d = degenerate(x, y, pixel);
        let Rgb([r, g, b]) = *pixel;
        *pixel = Rgb([
            blend_channel(d[0], r, factor),
            blend_channel(d[1], g, factor),
            blend_channel(d[2], b, factor),
        ]);
    }
    out
}

/// Rounded mean luma over all pixels; 0 for an empty image.
pub fn mean_luma(img: &RgbImage) -> u8 {
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return 0;
    }
    let sum: u64 = img
        .pixels()
        .map(|Rgb([r, g, b])| luma(*r, *g, *b) as u64)
        .sum();
    ((sum as f64 / count as f64) + 0.5) as u8
}

pub fn contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let mean = mean_luma(img);
    blend_with(img, factor, |_, _, _| [mean; 3])
}

pub fn brightness(img: &RgbImage, factor: f32) -> RgbImage {
    blend_with(img, factor, |_, _, _| [0; 3])
}

pub fn saturation(img: &RgbImage, factor: f32) -> RgbImage {
    blend_with(img, factor, |_, _, Rgb([r, g, b])| [luma(*r, *g, *b); 3])
}

pub fn sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = convolve(img, &SMOOTH);
    blend_with(img, factor, |x, y, _| smoothed.get_pixel(x, y).0)
}
