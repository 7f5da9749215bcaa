//! Upload validation.
//!
//! Checks run cheapest first: filename, extension allow-list, size limit,
//! and finally a full decode. A file that passes is handed on already
//! decoded, so edits never decode the same bytes twice.

use crate::config::UploadsConfig;
use crate::imaging::{CodecError, codec};
use crate::naming::sanitize_stem;
use crate::output::format_file_size;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("no file selected")]
    MissingFilename,
    #[error("file type {0:?} is not allowed")]
    ExtensionNotAllowed(String),
    #[error("file is empty")]
    Empty,
    #[error("file is {} but the limit is {}", human(.size), human(.limit))]
    TooLarge {
        size: u64,
        limit: u64,
    },
    #[error("not a readable image: {0}")]
    NotAnImage(#[from] CodecError),
}

fn human(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// An upload that passed every check.
#[derive(Debug)]
pub struct ValidatedUpload {
    /// Sanitized filename stem, ready for output naming.
    pub stem: String,
    /// Lowercased extension as uploaded.
    pub extension: String,
    pub image: DynamicImage,
}

/// Validate `bytes` uploaded under `filename` against `config`.
#[instrument(level = "debug", skip(bytes, config), fields(len = bytes.len()))]
pub fn validate_upload(
    filename: &str,
    bytes: &[u8],
    config: &UploadsConfig,
) -> Result<ValidatedUpload, UploadError> {
    let extension = check_filename(filename, config)?;
    check_size(bytes.len() as u64, config)?;

    let image = codec::decode(bytes)?;
    let (width, height) = (image.width(), image.height());
    debug!(width, height, "Upload accepted");

    Ok(ValidatedUpload {
        stem: sanitize_stem(filename),
        extension,
        image,
    })
}

/// Filename and extension checks. Returns the lowercased extension.
pub fn check_filename(filename: &str, config: &UploadsConfig) -> Result<String, UploadError> {
    if filename.trim().is_empty() {
        return Err(UploadError::MissingFilename);
    }
    let extension = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !config.allows(&extension) {
        return Err(UploadError::ExtensionNotAllowed(extension));
    }
    Ok(extension)
}

/// Size checks, usable before any bytes are read.
pub fn check_size(size: u64, config: &UploadsConfig) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > config.max_bytes {
        return Err(UploadError::TooLarge {
            size,
            limit: config.max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{OutputFormat, Quality};
    use image::{Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
        codec::encode(&img, OutputFormat::Png, Quality::default()).unwrap()
    }

    #[test]
    fn accepts_valid_png() {
        let config = UploadsConfig::default();
        let upload = validate_upload("My Photo.PNG", &png_bytes(6, 4), &config).unwrap();
        assert_eq!(upload.stem, "My_Photo");
        assert_eq!(upload.extension, "png");
        assert_eq!((upload.image.width(), upload.image.height()), (6, 4));
    }

    #[test]
    fn rejects_missing_filename() {
        let config = UploadsConfig::default();
        let err = validate_upload("  ", &png_bytes(2, 2), &config).unwrap_err();
        assert!(matches!(err, UploadError::MissingFilename));
    }

    #[test]
    fn rejects_disallowed_extension() {
        let config = UploadsConfig::default();
        let err = validate_upload("anim.gif", &png_bytes(2, 2), &config).unwrap_err();
        assert!(matches!(err, UploadError::ExtensionNotAllowed(ref e) if e == "gif"));
    }

    #[test]
    fn rejects_missing_extension() {
        let config = UploadsConfig::default();
        let err = validate_upload("photo", &png_bytes(2, 2), &config).unwrap_err();
        assert!(matches!(err, UploadError::ExtensionNotAllowed(ref e) if e.is_empty()));
    }

    #[test]
    fn rejects_empty_file() {
        let config = UploadsConfig::default();
        let err = validate_upload("photo.png", &[], &config).unwrap_err();
        assert!(matches!(err, UploadError::Empty));
    }

    #[test]
    fn rejects_oversized_file() {
        let config = UploadsConfig {
            max_bytes: 10,
            ..UploadsConfig::default()
        };
        let bytes = png_bytes(8, 8);
        let err = validate_upload("photo.png", &bytes, &config).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 10, .. }));
        assert!(err.to_string().ends_with("the limit is 10 B"));
    }

    #[test]
    fn size_check_needs_no_bytes() {
        let config = UploadsConfig::default();
        assert!(check_size(1, &config).is_ok());
        assert!(check_size(config.max_bytes, &config).is_ok());
        assert!(matches!(check_size(0, &config), Err(UploadError::Empty)));
        let err = check_size(config.max_bytes + 1, &config).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let config = UploadsConfig::default();
        let err = validate_upload("photo.jpg", b"plain text", &config).unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage(_)));
    }

    #[test]
    fn extension_check_runs_before_decode() {
        let config = UploadsConfig::default();
        let err = validate_upload("notes.txt", b"plain text", &config).unwrap_err();
        assert!(matches!(err, UploadError::ExtensionNotAllowed(_)));
    }
}
