//! Region compositor for the `background` edit.
//!
//! The effect is a radial blend between the source and a blurred copy. It is
//! not object-aware: there is no foreground segmentation, only distance from
//! the image center.
//!
//! ```text
//! blurred = gaussian(source, radius)
//! mask    = region_mask(width, height)      # weight of the *original*
//! out     = blurred·(1 − mask/255) + source·(mask/255)
//! ```
//!
//! The mask is 0 at the center, ramps up to the falloff radius
//! `min(width, height) / 3`, and is 255 beyond it. The result is therefore
//! blurred at the center and sharp toward the edges, which is the opposite
//! of what "center focus" suggests. The formula is kept as-is so outputs stay
//! compatible with existing edits.

use super::calculations::{MaskGeometry, composite_channel, mask_value};
use super::filters::gaussian_blur;
use image::{GrayImage, RgbImage};
use rayon::prelude::*;
use tracing::debug;

/// Build the region mask for a `width × height` image.
///
/// Rows are filled in parallel; every cell depends only on its coordinates.
pub fn region_mask(width: u32, height: u32) -> GrayImage {
    let geometry = MaskGeometry::for_dimensions(width, height);
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }
    mask.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = mask_value(x as u32, y as u32, &geometry);
            }
        });
    mask
}

/// Blend `original` over `blurred` using `mask` as the original's weight.
///
/// All three inputs must share dimensions.
pub fn composite(original: &RgbImage, blurred: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = blurred.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let m = mask.get_pixel(x, y).0[0];
        let src = original.get_pixel(x, y).0;
        for c in 0..3 {
            pixel.0[c] = composite_channel(src[c], pixel.0[c], m);
        }
    }
    out
}

/// The full background effect at `blur_radius`.
///
/// A zero-width or zero-height image returns the (empty) blurred copy.
pub fn focus_blend(img: &RgbImage, blur_radius: f32) -> RgbImage {
    let blurred = gaussian_blur(img, blur_radius);
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return blurred;
    }
    let mask = region_mask(width, height);
    let max_radius = MaskGeometry::for_dimensions(width, height).max_radius;
    debug!(width, height, max_radius, blur_radius, "Mask built");
    composite(img, &blurred, &mask)
}
