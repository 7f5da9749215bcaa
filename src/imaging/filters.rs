//! Neighbourhood filters: convolution kernels, median, Gaussian blur, unsharp mask.
//!
//! Kernels follow the usual `sum(weights · window) / scale + offset` form,
//! rounded and clipped per channel. Pixels closer than the kernel radius to
//! an edge are copied through unchanged, so every filter preserves
//! dimensions.
//!
//! Median and Gaussian blur come from `imageproc`; the kernels and unsharp
//! mask are implemented here.

use super::params::UnsharpMask;
use image::RgbImage;
use rayon::prelude::*;

/// A square convolution kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    /// Side length; 3 or 5.
    pub size: u32,
    pub scale: f32,
    pub offset: f32,
    /// Row-major weights, `size * size` entries.
    pub weights: &'static [f32],
}

impl Kernel {
    pub fn radius(&self) -> u32 {
        self.size / 2
    }
}

/// Mild edge enhancement.
pub const EDGE_ENHANCE: Kernel = Kernel {
    size: 3,
    scale: 2.0,
    offset: 0.0,
    weights: &[-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
};

/// Strong edge enhancement.
pub const EDGE_ENHANCE_STRONG: Kernel = Kernel {
    size: 3,
    scale: 1.0,
    offset: 0.0,
    weights: &[-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0],
};

/// Light 3×3 smoothing; also the degenerate image for sharpness.
pub const SMOOTH: Kernel = Kernel {
    size: 3,
    scale: 13.0,
    offset: 0.0,
    weights: &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
};

/// Strong 5×5 smoothing.
pub const SMOOTH_STRONG: Kernel = Kernel {
    size: 5,
    scale: 100.0,
    offset: 0.0,
    weights: &[
        1.0, 1.0,  1.0, 1.0, 1.0,
        1.0, 5.0,  5.0, 5.0, 1.0,
        1.0, 5.0, 44.0, 5.0, 1.0,
        1.0, 5.0,  5.0, 5.0, 1.0,
        1.0, 1.0,  1.0, 1.0, 1.0,
    ],
};

#[inline]
fn clip_round(v: f32) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

/// Apply `kernel` to every interior pixel; border pixels are copied.
///
/// Rows are computed in parallel; each output row depends only on the
/// source image.
pub fn convolve(img: &RgbImage, kernel: &Kernel) -> RgbImage {
    let (width, height) = img.dimensions();
    let r = kernel.radius();
    let mut out = img.clone();
    if width <= 2 * r || height <= 2 * r {
        return out;
    }

    let row_len = width as usize * 3;
    let size = kernel.size as usize;
    out.par_chunks_mut(row_len)
        .enumerate()
        .filter(|(y, _)| *y as u32 >= r && (*y as u32) < height - r)
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in r..width - r {
                let mut acc = [0.0f32; 3];
                for ky in 0..size {
                    for kx in 0..size {
                        let w = kernel.weights[ky * size + kx];
                        let px = img.get_pixel(x + kx as u32 - r, y + ky as u32 - r);
                        for c in 0..3 {
                            acc[c] += w * px.0[c] as f32;
                        }
                    }
                }
                let base = x as usize * 3;
                for c in 0..3 {
                    row[base + c] = clip_round(acc[c] / kernel.scale + kernel.offset);
                }
            }
        });
    out
}

/// Median over a `size × size` window (odd sizes), edges replicated.
pub fn median_denoise(img: &RgbImage, size: u32) -> RgbImage {
    if img.width() == 0 || img.height() == 0 || size < 2 {
        return img.clone();
    }
    let radius = size / 2;
    imageproc::filter::median_filter(img, radius, radius)
}

/// Gaussian blur with `radius` as the standard deviation.
///
/// A radius of zero or below (or a non-finite one) is the identity.
pub fn gaussian_blur(img: &RgbImage, radius: f32) -> RgbImage {
    if radius <= 0.0 || !radius.is_finite() || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    imageproc::filter::gaussian_blur_f32(img, radius)
}

/// Add back `percent`% of the difference between the image and its blur,
/// only where that difference reaches `threshold`.
pub fn unsharp_mask(img: &RgbImage, mask: &UnsharpMask) -> RgbImage {
    let blurred = gaussian_blur(img, mask.radius);
    let amount = mask.percent as f32 / 100.0;
    let threshold = mask.threshold as i32;

    let mut out = img.clone();
    for (src, blur) in out.iter_mut().zip(blurred.iter()) {
        let diff = *src as i32 - *blur as i32;
        if diff.abs() >= threshold {
            *src = clip_round(*src as f32 + diff as f32 * amount);
        }
    }
    out
}
