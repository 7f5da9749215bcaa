//! Output filenames for edited images and thumbnails.
//!
//! ```text
//! holiday photo.PNG  ──sanitize──▶  holiday_photo
//!                    ──edit──────▶  holiday_photo_edited_enhance_3fa9c01b.jpg
//!                    ──thumb─────▶  holiday_photo_thumb.jpg
//! ```
//!
//! The 8-hex id is the prefix of a SHA-256 over the source bytes, the edit
//! type and the intensity. The same upload edited the same way always gets
//! the same name, so re-running a batch overwrites instead of piling up.

use crate::imaging::OutputFormat;
use crate::request::{EditRequest, EditType};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Length of the hex id embedded in edited filenames.
pub const ID_LEN: usize = 8;

/// Stem used when nothing survives sanitizing.
const FALLBACK_STEM: &str = "image";

/// Reduce a user-supplied filename to a safe ASCII stem.
///
/// Drops the extension and any directory part, turns whitespace into `_`,
/// discards everything outside `[A-Za-z0-9_.-]`, and trims leading and
/// trailing `.`/`_`.
///
/// - `"holiday photo.png"` → `"holiday_photo"`
/// - `"../../etc/passwd"` → `"passwd"`
/// - `"café.jpg"` → `"caf"`
/// - `"???.png"` → `"image"`
pub fn sanitize_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = stem
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') => Some(c),
            _ => None,
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Content-derived id for one edit of one source.
pub fn edit_id(source: &[u8], request: &EditRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"edit\0");
    hasher.update(source);
    hasher.update(request.edit_type.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(request.intensity.value().to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LEN].to_string()
}

/// `{stem}_edited_{edit}_{id}.{ext}`
pub fn edited_filename(stem: &str, edit: EditType, id: &str, format: OutputFormat) -> String {
    format!("{stem}_edited_{edit}_{id}.{}", format.extension())
}

/// `{stem}_thumb.jpg`
pub fn thumbnail_filename(stem: &str) -> String {
    format!("{stem}_thumb.jpg")
}

/// Parts recovered from an edited filename.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedName {
    pub stem: String,
    pub edit_type: EditType,
    pub id: String,
}

/// Parse a name produced by [`edited_filename`]. Returns `None` for
/// anything else.
pub fn parse_edited_filename(name: &str) -> Option<EditedName> {
    let base = Path::new(name).file_stem()?.to_str()?;
    let mut parts = base.rsplitn(3, '_');
    let id = parts.next()?;
    let edit = parts.next()?;
    let stem = parts.next()?.strip_suffix("_edited")?;

    if stem.is_empty() || id.len() != ID_LEN || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(EditedName {
        stem: stem.to_string(),
        edit_type: edit.parse().ok()?,
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // sanitize_stem
    // =========================================================================

    #[test]
    fn sanitize_replaces_spaces() {
        assert_eq!(sanitize_stem("holiday photo.png"), "holiday_photo");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
    }

    #[test]
    fn sanitize_drops_non_ascii() {
        assert_eq!(sanitize_stem("café.jpg"), "caf");
    }

    #[test]
    fn sanitize_keeps_dashes_and_inner_dots() {
        assert_eq!(sanitize_stem("001-dawn.v2.jpg"), "001-dawn.v2");
    }

    #[test]
    fn sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_stem("???.png"), "image");
        assert_eq!(sanitize_stem(""), "image");
        assert_eq!(sanitize_stem("__.jpg"), "image");
    }

    // =========================================================================
    // edit_id
    // =========================================================================

    #[test]
    fn id_is_deterministic() {
        let req = EditRequest::new(EditType::Enhance, 50);
        assert_eq!(edit_id(b"pixels", &req), edit_id(b"pixels", &req));
        assert_eq!(edit_id(b"pixels", &req).len(), ID_LEN);
    }

    #[test]
    fn id_depends_on_every_input() {
        let enhance = EditRequest::new(EditType::Enhance, 50);
        let base = edit_id(b"pixels", &enhance);
        assert_ne!(base, edit_id(b"pixelz", &enhance));
        let style = EditRequest::new(EditType::Style, 50);
        assert_ne!(base, edit_id(b"pixels", &style));
        let stronger = EditRequest::new(EditType::Enhance, 51);
        assert_ne!(base, edit_id(b"pixels", &stronger));
    }

    // =========================================================================
    // Filenames
    // =========================================================================

    #[test]
    fn edited_filename_format() {
        assert_eq!(
            edited_filename("dawn", EditType::Restore, "0a1b2c3d", OutputFormat::Jpeg),
            "dawn_edited_restore_0a1b2c3d.jpg"
        );
        assert_eq!(
            edited_filename("dawn", EditType::Style, "0a1b2c3d", OutputFormat::Png),
            "dawn_edited_style_0a1b2c3d.png"
        );
    }

    #[test]
    fn thumbnail_filename_format() {
        assert_eq!(thumbnail_filename("dawn"), "dawn_thumb.jpg");
    }

    #[test]
    fn parse_recovers_parts() {
        let parsed = parse_edited_filename("my_dawn_edited_background_deadbeef.jpg").unwrap();
        assert_eq!(
            parsed,
            EditedName {
                stem: "my_dawn".into(),
                edit_type: EditType::Background,
                id: "deadbeef".into(),
            }
        );
    }

    #[test]
    fn parse_rejects_foreign_names() {
        assert_eq!(parse_edited_filename("dawn.jpg"), None);
        assert_eq!(parse_edited_filename("dawn_thumb.jpg"), None);
        assert_eq!(
            parse_edited_filename("dawn_edited_sepia_deadbeef.jpg"),
            None
        );
        assert_eq!(parse_edited_filename("dawn_edited_style_xyz.jpg"), None);
        assert_eq!(parse_edited_filename("_edited_style_deadbeef.jpg"), None);
    }

    #[test]
    fn generated_names_parse_back() {
        let req = EditRequest::new(EditType::Colorize, 75);
        let id = edit_id(b"bytes", &req);
        let name = edited_filename("beach_day", req.edit_type, &id, OutputFormat::Jpeg);
        let parsed = parse_edited_filename(&name).unwrap();
        assert_eq!(parsed.stem, "beach_day");
        assert_eq!(parsed.edit_type, EditType::Colorize);
        assert_eq!(parsed.id, id);
    }
}
