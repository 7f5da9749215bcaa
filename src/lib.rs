//! # snapedit
//!
//! Deterministic photo edits. Pick one of six named edits, pick an intensity
//! from 0 to 100, get an edited image back. The same input, edit and
//! intensity always produce the same pixels and the same output filename.
//!
//! # Architecture: Request → Chain → Raster
//!
//! ```text
//! 1. Request   "restore", 60     →  EditRequest { Restore, Intensity(60) }
//! 2. Plan      chain table @ f=0.6 → [median 3x3, sharpness x1.48, contrast x1.24, unsharp-mask]
//! 3. Apply     RgbImage ─step─▶ RgbImage ─step─▶ … (one FilterBackend call per step)
//! ```
//!
//! Chains are data, not code: each edit type is a static table of
//! `{gate, step}` rows in [`chain`], and the dispatcher in [`pipeline`]
//! walks the resolved steps through a [`imaging::FilterBackend`]. Tests swap
//! in a recording backend to assert exactly which steps ran.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`request`] | `EditType`, `Intensity`, `IntensityFactor`, `EditRequest` |
//! | [`chain`] | The six operator chains as gated step tables; `plan()` resolves them |
//! | [`pipeline`] | Dispatcher: `process`, `process_request`, `process_bytes`, cancellation |
//! | [`imaging`] | Pixel operations, filter backend, codec |
//! | [`upload`] | Upload validation: extension, size, decodability |
//! | [`naming`] | Content-derived output ids and filenames |
//! | [`process`] | Single and batch edit jobs, thumbnails, manifest |
//! | [`config`] | `config.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Hard Intensity Bands
//!
//! `restore` adds an unsharp mask only above f = 0.5; `style` switches
//! between three step sets at 0.4 and 0.7. These are hard cutoffs with `>`
//! semantics, so intensity 70 and 71 produce visibly different styles. Gates
//! are tagged values ([`chain::Gate`]) so the boundaries can be tested on
//! their own.
//!
//! ## No Clamping
//!
//! Intensities outside 0–100 are accepted by the pipeline and simply yield
//! larger or negative coefficients. Per-pixel results are clipped to 0–255.
//! Range checks belong to callers (the CLI validates, the library does not).
//!
//! ## Background Focus
//!
//! The `background` edit blends a blurred copy with the original through a
//! radial mask that is *zero at the centre*: the middle of the frame is the
//! blurriest part and everything beyond a third of the short side stays
//! sharp. See [`imaging::compositor`].
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, encoding and every filter run on `image` buffers, with
//! `imageproc` for median and Gaussian filtering. No system libraries.

pub mod chain;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod request;
pub mod upload;
