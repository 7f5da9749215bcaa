//! Operator chains: the ordered filter steps behind each edit type.
//!
//! Every chain is a static table of [`ChainStep`] rows. A row pairs a
//! [`StepKind`] (which filter, and the affine formula for its coefficient)
//! with a [`Gate`] (the intensity band in which the row runs). Planning a
//! chain filters rows by gate and resolves each formula at the request's
//! [`IntensityFactor`], yielding concrete [`FilterOp`]s.
//!
//! | Chain | Steps |
//! |---|---|
//! | enhance | contrast ×(1+0.5f) → brightness ×(1+0.2f) → sharpness ×(1+0.7f) → saturation ×(1+0.3f) |
//! | colorize | saturation ×(1+1.5f) → contrast ×(1+0.3f) → brightness ×(1+0.1f) |
//! | restore | median 3×3 → sharpness ×(1+0.8f) → contrast ×(1+0.4f) → [f > 0.5] unsharp-mask(2, 150%, 3) |
//! | retouch | gaussian-blur r=2f → brightness ×(1+0.1f) → contrast ×(1−0.1f) |
//! | style | [f > 0.7] edge-enhance-strong → saturation ×(1+f); [0.4 < f ≤ 0.7] edge-enhance → contrast ×(1+0.5f); [f ≤ 0.4] smooth-strong → saturation ×(1+0.5f) |
//! | background | focus-blend r=5f |
//!
//! Gates are hard cutoffs with no interpolation across a boundary. A factor
//! sitting exactly on a threshold belongs to the lower band (`>` not `>=`).
//!
//! Adding an edit means adding a table, not new control flow.

use crate::imaging::{FilterOp, UnsharpMask};
use crate::request::{EditType, IntensityFactor};
use std::fmt;

/// Coefficient formula `base + slope · f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub base: f64,
    pub slope: f64,
}

impl Affine {
    pub const fn new(base: f64, slope: f64) -> Self {
        Self { base, slope }
    }

    /// Multiplicative enhancer formula `1 + slope · f`.
    pub const fn one_plus(slope: f64) -> Self {
        Self::new(1.0, slope)
    }

    /// Pure scaling formula `slope · f`.
    pub const fn scaled(slope: f64) -> Self {
        Self::new(0.0, slope)
    }

    pub fn at(self, factor: IntensityFactor) -> f32 {
        (self.base + self.slope * factor.value()) as f32
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slope = match self.slope {
            s if s == 1.0 => "f".to_string(),
            s if s == -1.0 => "-f".to_string(),
            s => format!("{s}f"),
        };
        if self.base == 0.0 {
            return f.write_str(&slope);
        }
        match slope.strip_prefix('-') {
            Some(rest) => write!(f, "{}-{}", self.base, rest),
            None => write!(f, "{}+{}", self.base, slope),
        }
    }
}

/// Intensity band a chain row is gated on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    Always,
    /// `f > threshold`
    Above(f64),
    /// `f <= threshold`
    AtMost(f64),
    /// `above < f <= at_most`
    Band {
        above: f64,
        at_most: f64,
    },
}

impl Gate {
    pub fn admits(self, factor: IntensityFactor) -> bool {
        let f = factor.value();
        match self {
            Gate::Always => true,
            Gate::Above(t) => f > t,
            Gate::AtMost(t) => f <= t,
            Gate::Band { above, at_most } => f > above && f <= at_most,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Always => f.write_str("always"),
            Gate::Above(t) => write!(f, "f > {t}"),
            Gate::AtMost(t) => write!(f, "f <= {t}"),
            Gate::Band { above, at_most } => write!(f, "{above} < f <= {at_most}"),
        }
    }
}

/// Filter kind with its coefficient formula, before resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepKind {
    Contrast(Affine),
    Brightness(Affine),
    Sharpness(Affine),
    Saturation(Affine),
    GaussianBlur(Affine),
    MedianDenoise(u32),
    EdgeEnhance,
    EdgeEnhanceStrong,
    SmoothStrong,
    UnsharpMask(UnsharpMask),
    FocusBlend(Affine),
}

impl StepKind {
    pub fn resolve(self, factor: IntensityFactor) -> FilterOp {
        match self {
            StepKind::Contrast(a) => FilterOp::Contrast(a.at(factor)),
            StepKind::Brightness(a) => FilterOp::Brightness(a.at(factor)),
            StepKind::Sharpness(a) => FilterOp::Sharpness(a.at(factor)),
            StepKind::Saturation(a) => FilterOp::Saturation(a.at(factor)),
            StepKind::GaussianBlur(a) => FilterOp::GaussianBlur {
                radius: a.at(factor),
            },
            StepKind::MedianDenoise(size) => FilterOp::MedianDenoise { size },
            StepKind::EdgeEnhance => FilterOp::EdgeEnhance,
            StepKind::EdgeEnhanceStrong => FilterOp::EdgeEnhanceStrong,
            StepKind::SmoothStrong => FilterOp::SmoothStrong,
            StepKind::UnsharpMask(m) => FilterOp::UnsharpMask(m),
            StepKind::FocusBlend(a) => FilterOp::FocusBlend {
                blur_radius: a.at(factor),
            },
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Contrast(a) => write!(f, "contrast x({a})"),
            StepKind::Brightness(a) => write!(f, "brightness x({a})"),
            StepKind::Sharpness(a) => write!(f, "sharpness x({a})"),
            StepKind::Saturation(a) => write!(f, "saturation x({a})"),
            StepKind::GaussianBlur(a) => write!(f, "gaussian-blur r={a}"),
            StepKind::MedianDenoise(size) => write!(f, "median-denoise {size}x{size}"),
            StepKind::EdgeEnhance => f.write_str("edge-enhance"),
            StepKind::EdgeEnhanceStrong => f.write_str("edge-enhance-strong"),
            StepKind::SmoothStrong => f.write_str("smooth-strong"),
            StepKind::UnsharpMask(m) => write!(
                f,
                "unsharp-mask r={} {}% t={}",
                m.radius, m.percent, m.threshold
            ),
            StepKind::FocusBlend(a) => write!(f, "focus-blend r={a}"),
        }
    }
}

/// One row of a chain table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStep {
    pub gate: Gate,
    pub kind: StepKind,
}

const fn step(kind: StepKind) -> ChainStep {
    ChainStep {
        gate: Gate::Always,
        kind,
    }
}

const fn gated(gate: Gate, kind: StepKind) -> ChainStep {
    ChainStep { gate, kind }
}

pub const RESTORE_DETAIL: Gate = Gate::Above(0.5);
pub const STYLE_STRONG: Gate = Gate::Above(0.7);
pub const STYLE_MEDIUM: Gate = Gate::Band {
    above: 0.4,
    at_most: 0.7,
};
pub const STYLE_SUBTLE: Gate = Gate::AtMost(0.4);

static ENHANCE: [ChainStep; 4] = [
    step(StepKind::Contrast(Affine::one_plus(0.5))),
    step(StepKind::Brightness(Affine::one_plus(0.2))),
    step(StepKind::Sharpness(Affine::one_plus(0.7))),
    step(StepKind::Saturation(Affine::one_plus(0.3))),
];

static COLORIZE: [ChainStep; 3] = [
    step(StepKind::Saturation(Affine::one_plus(1.5))),
    step(StepKind::Contrast(Affine::one_plus(0.3))),
    step(StepKind::Brightness(Affine::one_plus(0.1))),
];

static RESTORE: [ChainStep; 4] = [
    step(StepKind::MedianDenoise(3)),
    step(StepKind::Sharpness(Affine::one_plus(0.8))),
    step(StepKind::Contrast(Affine::one_plus(0.4))),
    gated(
        RESTORE_DETAIL,
        StepKind::UnsharpMask(UnsharpMask::restore()),
    ),
];

static RETOUCH: [ChainStep; 3] = [
    step(StepKind::GaussianBlur(Affine::scaled(2.0))),
    step(StepKind::Brightness(Affine::one_plus(0.1))),
    step(StepKind::Contrast(Affine::one_plus(-0.1))),
];

static STYLE: [ChainStep; 6] = [
    gated(STYLE_STRONG, StepKind::EdgeEnhanceStrong),
    gated(STYLE_STRONG, StepKind::Saturation(Affine::one_plus(1.0))),
    gated(STYLE_MEDIUM, StepKind::EdgeEnhance),
    gated(STYLE_MEDIUM, StepKind::Contrast(Affine::one_plus(0.5))),
    gated(STYLE_SUBTLE, StepKind::SmoothStrong),
    gated(STYLE_SUBTLE, StepKind::Saturation(Affine::one_plus(0.5))),
];

static BACKGROUND: [ChainStep; 1] = [step(StepKind::FocusBlend(Affine::scaled(5.0)))];

/// The full table for `edit`, gated rows included.
pub fn chain_for(edit: EditType) -> &'static [ChainStep] {
    match edit {
        EditType::Enhance => &ENHANCE,
        EditType::Colorize => &COLORIZE,
        EditType::Restore => &RESTORE,
        EditType::Retouch => &RETOUCH,
        EditType::Style => &STYLE,
        EditType::Background => &BACKGROUND,
    }
}

/// Resolve `edit` at `factor` into the ordered steps that will run.
pub fn plan(edit: EditType, factor: IntensityFactor) -> Vec<FilterOp> {
    chain_for(edit)
        .iter()
        .filter(|row| row.gate.admits(factor))
        .map(|row| row.kind.resolve(factor))
        .collect()
}
