//! Edit request types shared by the pipeline, the job runner, and the CLI.
//!
//! An [`EditRequest`] is an immutable `(edit type, intensity)` pair. The
//! intensity is a user-facing integer, nominally `0..=100`; every operator
//! coefficient is an affine function of the derived [`IntensityFactor`].
//!
//! Out-of-range intensities are **not** clamped here. Callers validate input;
//! the pipeline itself just produces out-of-range coefficients, which the
//! pixel math clips per channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six named edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditType {
    Enhance,
    Restore,
    Retouch,
    Style,
    Background,
    Colorize,
}

impl EditType {
    /// All edit types in display order.
    pub const ALL: [EditType; 6] = [
        EditType::Enhance,
        EditType::Restore,
        EditType::Retouch,
        EditType::Style,
        EditType::Background,
        EditType::Colorize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditType::Enhance => "enhance",
            EditType::Restore => "restore",
            EditType::Retouch => "retouch",
            EditType::Style => "style",
            EditType::Background => "background",
            EditType::Colorize => "colorize",
        }
    }
}

impl fmt::Display for EditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an edit type string names none of the six edits.
///
/// Carries the offending value verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported edit type: {0:?}")]
pub struct UnsupportedEditType(pub String);

impl FromStr for EditType {
    type Err = UnsupportedEditType;

    /// Exact, case-sensitive match against the lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditType::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnsupportedEditType(s.to_string()))
    }
}

/// User-facing intensity, nominally `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intensity(pub i32);

impl Intensity {
    pub const DEFAULT: Intensity = Intensity(50);

    pub fn value(self) -> i32 {
        self.0
    }

    /// `intensity / 100.0`, unclamped.
    pub fn factor(self) -> IntensityFactor {
        IntensityFactor(self.0 as f64 / 100.0)
    }

    pub fn in_range(self) -> bool {
        (0..=100).contains(&self.0)
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized intensity; `0.0..=1.0` for in-range requests.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct IntensityFactor(pub f64);

impl IntensityFactor {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// An immutable edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub edit_type: EditType,
    pub intensity: Intensity,
}

impl EditRequest {
    pub fn new(edit_type: EditType, intensity: i32) -> Self {
        Self {
            edit_type,
            intensity: Intensity(intensity),
        }
    }

    /// Parse the edit type and pair it with `intensity`.
    pub fn parse(edit_type: &str, intensity: i32) -> Result<Self, UnsupportedEditType> {
        Ok(Self::new(edit_type.parse()?, intensity))
    }

    pub fn factor(&self) -> IntensityFactor {
        self.intensity.factor()
    }
}
