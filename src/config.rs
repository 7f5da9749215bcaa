//! Editor configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user `config.toml` in the config directory is merged on
//! top of them key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [edits]
//! default_intensity = 50        # used when --intensity is omitted (0-100)
//!
//! [output]
//! format = "jpeg"               # jpeg | png
//! jpeg_quality = 95             # 1-100
//!
//! [uploads]
//! max_bytes = 5242880           # 5 MiB
//! allowed_extensions = ["png", "jpg", "jpeg", "webp"]
//!
//! [thumbnails]
//! max_size = [200, 200]         # fit-inside box, never upscaled
//! quality = 85
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [output]
//! format = "png"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality, supported_input_extensions};
use crate::request::Intensity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Request defaults.
    pub edits: EditsConfig,
    /// Encoding of edited images.
    pub output: OutputConfig,
    /// Upload validation limits.
    pub uploads: UploadsConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Intensity(self.edits.default_intensity).in_range() {
            return Err(ConfigError::Validation(
                "edits.default_intensity must be 0-100".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_size[0] == 0 || self.thumbnails.max_size[1] == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_size values must be non-zero".into(),
            ));
        }
        if self.uploads.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "uploads.max_bytes must be non-zero".into(),
            ));
        }
        if self.uploads.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "uploads.allowed_extensions must not be empty".into(),
            ));
        }
        let decodable = supported_input_extensions();
        if let Some(ext) = self
            .uploads
            .allowed_extensions
            .iter()
            .find(|ext| !decodable.iter().any(|d| d.eq_ignore_ascii_case(ext)))
        {
            return Err(ConfigError::Validation(format!(
                "uploads.allowed_extensions: no decoder for \"{ext}\""
            )));
        }
        Ok(())
    }
}

/// Request defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditsConfig {
    /// Intensity applied when a request does not name one.
    pub default_intensity: i32,
}

impl Default for EditsConfig {
    fn default() -> Self {
        Self {
            default_intensity: Intensity::DEFAULT.value(),
        }
    }
}

/// Encoding of edited images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG quality (1 = worst, 100 = best). Ignored for PNG.
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            jpeg_quality: 95,
        }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }
}

/// Upload validation limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Largest accepted upload, in bytes.
    pub max_bytes: u64,
    /// Accepted filename extensions, compared case-insensitively.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadsConfig {
    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box as `[width, height]`; thumbnails fit inside it.
    pub max_size: [u32; 2],
    /// JPEG quality of the thumbnail.
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_size: [200, 200],
            quality: 85,
        }
    }
}

impl ThumbnailsConfig {
    pub fn bounds(&self) -> (u32, u32) {
        (self.max_size[0], self.max_size[1])
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel edit workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Stock defaults as a TOML table, ready for [`merge_toml`].
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(EditorConfig::default())?)
}

/// Name of the optional user config file inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Lay `user` over `stock`.
///
/// Tables merge key by key, recursing into nested tables. Any other user
/// value, arrays included, replaces the stock one outright.
pub fn merge_toml(stock: toml::Value, user: toml::Value) -> toml::Value {
    match (stock, user) {
        (toml::Value::Table(mut table), toml::Value::Table(user_table)) => {
            for (key, value) in user_table {
                let merged = match table.remove(&key) {
                    Some(stock_value) => merge_toml(stock_value, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, user) => user,
    }
}

/// Parse the user's config file in `dir`, or `None` when there isn't one.
fn read_user_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    match fs::read_to_string(dir.join(CONFIG_FILENAME)) {
        Ok(content) => Ok(Some(toml::from_str(&content)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Stock defaults with the user's `config.toml` from `dir` merged on top.
///
/// A missing file means stock settings. Unknown keys and out-of-range
/// values are errors.
pub fn load_config(dir: &Path) -> Result<EditorConfig, ConfigError> {
    let stock = stock_defaults_value()?;
    let merged = match read_user_config(dir)? {
        Some(user) => merge_toml(stock, user),
        None => stock,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# snapedit configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# snapedit reads config.toml from --config-dir (default: current directory).
# The file only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Edit requests
# ---------------------------------------------------------------------------
[edits]
# Intensity used when --intensity is omitted (0-100).
default_intensity = 50

# ---------------------------------------------------------------------------
# Edited output
# ---------------------------------------------------------------------------
[output]
# "jpeg" or "png".
format = "jpeg"

# JPEG encoding quality (1 = worst, 100 = best). Ignored for PNG.
jpeg_quality = 95

# ---------------------------------------------------------------------------
# Upload validation
# ---------------------------------------------------------------------------
[uploads]
# Largest accepted input file, in bytes (5 MiB).
max_bytes = 5242880

# Accepted filename extensions (case-insensitive).
allowed_extensions = ["png", "jpg", "jpeg", "webp"]

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Bounding box as [width, height]. Aspect ratio is kept; never upscaled.
max_size = [200, 200]

# JPEG encoding quality of thumbnails.
quality = 85

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel edit workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
