//! CLI output formatting.
//!
//! # Output Format
//!
//! ## apply
//!
//! ```text
//! dawn.png → dawn_edited_restore_3fa9c01b.jpg
//!     Edit: restore @ 60
//!     Size: 1200x800, 412.37 KB
//!     Steps:
//!         1. median-denoise 3x3
//!         2. sharpness x1.480
//!         3. contrast x1.240
//!         4. unsharp-mask r=2 150% t=3
//! ```
//!
//! ## batch
//!
//! ```text
//! enhance @ 50 (3 photos)
//!     001 dawn.jpg → dawn_edited_enhance_3fa9c01b.jpg
//!         Size: 1200x800, 398.2 KB
//!     002 broken.jpg
//!         FAILED: broken.jpg: not a readable image: ...
//!
//! Edited 2 photos, 1 failed
//! Manifest: edited/manifest.json
//! ```
//!
//! ## check
//!
//! ```text
//! photos/dawn.PNG: OK
//!     Size: 1200x800, 2.4 MB
//!     Type: png
//!     Color: Rgb8
//!     Stem: dawn
//! ```
//!
//! ## edits
//!
//! ```text
//! style
//!     1. edge-enhance-strong          [f > 0.7]
//!     2. saturation x(1+f)            [f > 0.7]
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::chain::{self, Gate};
use crate::process::{BatchResult, EditRecord, ProcessEvent, ThumbnailRecord};
use crate::request::EditType;
use crate::upload::ValidatedUpload;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Final path component, or the whole string if there is none.
fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn size_line(dimensions: (u32, u32), bytes: u64) -> String {
    format!(
        "Size: {}x{}, {}",
        dimensions.0,
        dimensions.1,
        format_file_size(bytes)
    )
}

fn photos(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{n} photos")
    }
}

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size, base 1024, at most two decimals.
///
/// `0` → `"0 B"`, `1536` → `"1.5 KB"`, `2097152` → `"2 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

// ============================================================================
// apply / thumbnail / check
// ============================================================================

/// Format a finished single edit.
pub fn format_edit_record(record: &EditRecord) -> Vec<String> {
    let mut lines = vec![
        format!("{} \u{2192} {}", file_name(&record.source), record.output),
        format!(
            "{}Edit: {} @ {}",
            indent(1),
            record.edit_type,
            record.intensity
        ),
        format!(
            "{}{}",
            indent(1),
            size_line(record.dimensions, record.bytes)
        ),
    ];
    if record.steps.is_empty() {
        lines.push(format!("{}Steps: none", indent(1)));
    } else {
        lines.push(format!("{}Steps:", indent(1)));
        for (i, step) in record.steps.iter().enumerate() {
            lines.push(format!("{}{}. {}", indent(2), i + 1, step));
        }
    }
    lines
}

pub fn print_edit_record(record: &EditRecord) {
    for line in format_edit_record(record) {
        println!("{}", line);
    }
}

pub fn format_thumbnail_record(record: &ThumbnailRecord) -> Vec<String> {
    vec![
        format!("{} \u{2192} {}", file_name(&record.source), record.output),
        format!(
            "{}{}",
            indent(1),
            size_line(record.dimensions, record.bytes)
        ),
    ]
}

pub fn print_thumbnail_record(record: &ThumbnailRecord) {
    for line in format_thumbnail_record(record) {
        println!("{}", line);
    }
}

/// Format a passed upload check.
pub fn format_check(path: &Path, bytes: u64, upload: &ValidatedUpload) -> Vec<String> {
    vec![
        format!("{}: OK", path.display()),
        format!(
            "{}{}",
            indent(1),
            size_line((upload.image.width(), upload.image.height()), bytes)
        ),
        format!("{}Type: {}", indent(1), upload.extension),
        format!("{}Color: {:?}", indent(1), upload.image.color()),
        format!("{}Stem: {}", indent(1), upload.stem),
    ]
}

pub fn print_check(path: &Path, bytes: u64, upload: &ValidatedUpload) {
    for line in format_check(path, bytes, upload) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total, request } => {
            let header = format!(
                "{} @ {} ({})",
                request.edit_type,
                request.intensity,
                photos(*total)
            );
            vec![header]
        }
        ProcessEvent::EditFinished { index, record } => vec![
            format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(*index),
                file_name(&record.source),
                record.output
            ),
            format!(
                "{}{}",
                indent(2),
                size_line(record.dimensions, record.bytes)
            ),
        ],
        ProcessEvent::EditFailed {
            index,
            source,
            error,
        } => vec![
            format!(
                "{}{} {}",
                indent(1),
                format_index(*index),
                file_name(source)
            ),
            format!("{}FAILED: {}", indent(2), error),
        ],
    }
}

/// Format the closing summary of a batch.
pub fn format_batch_summary(result: &BatchResult, manifest: Option<&Path>) -> Vec<String> {
    let mut summary = format!("Edited {}", photos(result.records.len()));
    if !result.failures.is_empty() {
        summary.push_str(&format!(", {} failed", result.failures.len()));
    }
    let mut lines = vec![String::new(), summary];
    if let Some(path) = manifest {
        lines.push(format!("Manifest: {}", path.display()));
    }
    lines
}

pub fn print_batch_summary(result: &BatchResult, manifest: Option<&Path>) {
    for line in format_batch_summary(result, manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// edits
// ============================================================================

const STEP_COLUMN: usize = 32;

/// Format every edit type with its ordered step table.
pub fn format_chain_table() -> Vec<String> {
    let mut lines = Vec::new();
    for edit in EditType::ALL {
        lines.push(edit.to_string());
        for (i, row) in chain::chain_for(edit).iter().enumerate() {
            let step = format!("{}. {}", i + 1, row.kind);
            match row.gate {
                Gate::Always => lines.push(format!("{}{}", indent(1), step)),
                gate => lines.push(format!(
                    "{}{:<width$}[{}]",
                    indent(1),
                    step,
                    gate,
                    width = STEP_COLUMN
                )),
            }
        }
    }
    lines
}

pub fn print_chain_table() {
    for line in format_chain_table() {
        println!("{}", line);
    }
}
