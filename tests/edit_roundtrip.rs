//! End-to-end edits through the public API: PNG on disk → edit → decoded output.

use image::{DynamicImage, Rgb, RgbImage};
use snapedit::config::EditorConfig;
use snapedit::imaging::{OutputFormat, Quality, codec};
use snapedit::naming::parse_edited_filename;
use snapedit::pipeline::{PipelineError, process, process_bytes};
use snapedit::process::{EditJob, run_batch, run_edit, write_manifest};
use snapedit::request::{EditRequest, EditType};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let stripe = if (x / 4 + y / 4) % 2 == 0 { 40 } else { 0 };
        Rgb([
            (60 + x * 2 % 120 + stripe) as u8,
            (90 + y * 3 % 100) as u8,
            (150 - stripe) as u8,
        ])
    })
}

fn write_scene(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image = scene(width, height);
    let png = codec::encode(&image, OutputFormat::Png, Quality::default()).unwrap();
    fs::write(&path, png).unwrap();
    path
}

#[test]
fn every_edit_roundtrips_through_disk() {
    let tmp = TempDir::new().unwrap();
    let source = write_scene(tmp.path(), "street scene.png", 64, 48);
    let out = tmp.path().join("edited");
    let config = EditorConfig::default();

    for edit in EditType::ALL {
        let job = EditJob {
            source: source.clone(),
            request: EditRequest::new(edit, 65),
        };
        let record = run_edit(&job, &out, &config).unwrap();

        let parsed = parse_edited_filename(&record.output).unwrap();
        assert_eq!(parsed.stem, "street_scene");
        assert_eq!(parsed.edit_type, edit);
        assert_eq!(parsed.id, record.id);

        let bytes = fs::read(out.join(&record.output)).unwrap();
        let decoded = codec::decode_rgb(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 48), "{edit}");
    }
}

#[test]
fn png_output_matches_in_memory_pipeline() {
    let tmp = TempDir::new().unwrap();
    let source = write_scene(tmp.path(), "a.png", 40, 30);
    let mut config = EditorConfig::default();
    config.output.format = OutputFormat::Png;

    let job = EditJob {
        source,
        request: EditRequest::new(EditType::Restore, 75),
    };
    let record = run_edit(&job, tmp.path(), &config).unwrap();
    let bytes = fs::read(tmp.path().join(&record.output)).unwrap();
    let on_disk = codec::decode_rgb(&bytes).unwrap();

    let image = DynamicImage::ImageRgb8(scene(40, 30));
    let in_memory = process(&image, "restore", 75).unwrap();
    assert_eq!(on_disk, in_memory);
}

#[test]
fn bytes_api_rejects_unknown_edit_before_decoding() {
    let quality = Quality::default();
    let err = process_bytes(b"", "sepia", 50, OutputFormat::Jpeg, quality).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedEditType(ref s) if s == "sepia"));
}

#[test]
fn style_bands_differ_across_the_boundary() {
    let img = DynamicImage::ImageRgb8(scene(32, 32));
    let at_70 = process(&img, "style", 70).unwrap();
    let at_71 = process(&img, "style", 71).unwrap();
    assert_ne!(at_70, at_71);
}

#[test]
fn batch_writes_outputs_and_manifest() {
    let tmp = TempDir::new().unwrap();
    let photos = tmp.path().join("photos");
    fs::create_dir(&photos).unwrap();
    write_scene(&photos, "one.png", 20, 20);
    write_scene(&photos, "two.png", 30, 10);
    let out = tmp.path().join("edited");
    let config = EditorConfig::default();
    let request = EditRequest::new(EditType::Background, 40);

    let result = run_batch(&photos, request, &out, &config, None).unwrap();
    assert_eq!(result.records.len(), 2);
    assert!(result.failures.is_empty());

    let manifest = write_manifest(&out, &result.records).unwrap();
    let text = fs::read_to_string(manifest).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["edit_type"], "background");
    assert_eq!(entries[0]["intensity"], 40);
    for record in &result.records {
        assert!(out.join(&record.output).exists());
    }

    // Re-running overwrites rather than duplicating
    let again = run_batch(&photos, request, &out, &config, None).unwrap();
    assert_eq!(again.records, result.records);
}
