//! Filter backend trait and shared error type.
//!
//! The [`FilterBackend`] trait applies one [`FilterOp`] to an RGB raster.
//! Chains are planned as a list of ops and fed through a backend step by
//! step; this keeps the chain table testable against a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::FilterOp;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
    },
    #[error("{op} requires a non-empty image, got {width}x{height}")]
    EmptyImage {
        op: &'static str,
        width: u32,
        height: u32,
    },
    #[error("filter failed: {0}")]
    Failed(String),
}

/// Trait for filter backends.
///
/// `Sync` so one backend can serve parallel jobs.
pub trait FilterBackend: Sync {
    /// Apply a single step, consuming the input raster.
    fn apply(&self, image: RgbImage, op: &FilterOp) -> Result<RgbImage, FilterError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns the input unchanged.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub operations: Mutex<Vec<FilterOp>>,
        /// Step name that should fail, if any.
        pub fail_on: Option<&'static str>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<FilterOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn step_names(&self) -> Vec<&'static str> {
            self.get_operations().iter().map(FilterOp::name).collect()
        }
    }

    impl FilterBackend for RecordingBackend {
        fn apply(&self, image: RgbImage, op: &FilterOp) -> Result<RgbImage, FilterError> {
            self.operations.lock().unwrap().push(*op);
            if self.fail_on == Some(op.name()) {
                return Err(FilterError::Failed(format!("mock failure in {}", op.name())));
            }
            Ok(image)
        }
    }

    #[test]
    fn mock_records_in_order() {
        let backend = RecordingBackend::new();
        let img = RgbImage::new(4, 4);
        let img = backend.apply(img, &FilterOp::Contrast(1.2)).unwrap();
        backend.apply(img, &FilterOp::EdgeEnhance).unwrap();

        assert_eq!(backend.step_names(), vec!["contrast", "edge-enhance"]);
        assert!(matches!(backend.get_operations()[0], FilterOp::Contrast(v) if v == 1.2));
    }

    #[test]
    fn mock_fails_on_named_step() {
        let backend = RecordingBackend::failing_on("saturation");
        let img = RgbImage::new(2, 2);
        assert!(backend.apply(img.clone(), &FilterOp::Contrast(1.0)).is_ok());
        let err = backend.apply(img, &FilterOp::Saturation(1.0)).unwrap_err();
        let expected = FilterError::Failed("mock failure in saturation".into());
        assert_eq!(err, expected);
    }

    #[test]
    fn error_messages() {
        let e = FilterError::InvalidParameter {
            name: "contrast",
            value: f32::INFINITY,
        };
        assert_eq!(e.to_string(), "invalid parameter contrast = inf");
        let e = FilterError::EmptyImage {
            op: "median-denoise",
            width: 0,
            height: 3,
        };
        assert_eq!(
            e.to_string(),
            "median-denoise requires a non-empty image, got 0x3"
        );
    }
}
