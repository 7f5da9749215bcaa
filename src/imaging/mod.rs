//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (JPEG, PNG, TIFF, WebP in; JPEG, PNG out) |
//! | **Enhancers** | blend-against-degenerate on `image` buffers |
//! | **Kernels** | 3×3 / 5×5 convolution, row-parallel with `rayon` |
//! | **Median / Gaussian** | `imageproc::filter` |
//! | **Background focus** | radial region mask + composite |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for pixel and geometry math (unit testable)
//! - **Parameters**: Data structures describing filter steps
//! - **Backend**: [`FilterBackend`] trait + [`RustBackend`]
//! - **Enhance / Filters / Compositor**: the pixel operations themselves
//! - **Codec**: decode, encode, thumbnail

pub mod backend;
mod calculations;
pub mod codec;
pub mod compositor;
pub mod enhance;
pub mod filters;
mod params;
pub mod rust_backend;

pub use backend::{FilterBackend, FilterError};
pub use calculations::{MaskGeometry, calculate_fit_dimensions, mask_value};
pub use codec::{CodecError, decode, decode_rgb, encode, supported_input_extensions, thumbnail};
pub use params::{FilterOp, OutputFormat, Quality, UnsharpMask};
pub use rust_backend::RustBackend;
