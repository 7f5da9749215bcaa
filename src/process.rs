//! Edit jobs: files in, edited files out.
//!
//! Wraps the pipeline with the collaborators it does not own itself: upload
//! validation, output naming, encoding, and writing to disk.
//!
//! ## Output Structure
//!
//! ```text
//! edited/
//! ├── manifest.json                            # batch runs only
//! ├── dawn_edited_enhance_3fa9c01b.jpg
//! ├── dusk_edited_enhance_91e0d7a2.jpg
//! └── dawn_thumb.jpg                           # `thumbnail` command
//! ```
//!
//! ## Parallel Processing
//!
//! Batch jobs run in parallel using [rayon](https://docs.rs/rayon). Each job
//! owns its buffers; the only shared state is the progress channel. A failed
//! job is reported and skipped, it never aborts the batch.

use crate::chain;
use crate::config::{EditorConfig, UploadsConfig};
use crate::imaging::{CodecError, FilterBackend, OutputFormat, RustBackend, codec};
use crate::naming;
use crate::pipeline::{self, CancelToken, PipelineError};
use crate::request::{EditRequest, EditType, Intensity};
use crate::upload::{UploadError, ValidatedUpload, check_filename, check_size, validate_upload};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

/// Name of the batch manifest within the output directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}: {source}", .path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: UploadError,
    },
    #[error("{}: {source}", .path.display())]
    Pipeline {
        path: PathBuf,
        #[source]
        source: PipelineError,
    },
    #[error("thumbnail encode failed: {0}")]
    Thumbnail(#[from] CodecError),
    #[error("no supported images found in {}", .0.display())]
    NoImages(PathBuf),
}

/// One file to edit.
#[derive(Debug, Clone)]
pub struct EditJob {
    pub source: PathBuf,
    pub request: EditRequest,
}

/// Result of one finished edit. Batch manifests are a JSON list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    pub source: String,
    /// Output filename, relative to the output directory.
    pub output: String,
    pub edit_type: EditType,
    pub intensity: Intensity,
    pub id: String,
    pub dimensions: (u32, u32),
    /// Steps that ran, in order.
    pub steps: Vec<String>,
    /// Encoded output size.
    pub bytes: u64,
}

/// Result of one thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailRecord {
    pub source: String,
    pub output: String,
    pub dimensions: (u32, u32),
    pub bytes: u64,
}

/// Progress event sent from batch workers.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted {
        total: usize,
        request: EditRequest,
    },
    EditFinished {
        index: usize,
        record: EditRecord,
    },
    EditFailed {
        index: usize,
        source: String,
        error: String,
    },
}

/// A job that failed inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successful edits, in source order.
    pub records: Vec<EditRecord>,
    pub failures: Vec<BatchFailure>,
}

/// Edit one file with the pure Rust backend.
pub fn run_edit(
    job: &EditJob,
    output_dir: &Path,
    config: &EditorConfig,
) -> Result<EditRecord, ProcessError> {
    let backend = RustBackend::new();
    run_edit_with(&backend, job, output_dir, config, &CancelToken::new())
}

/// Edit one file using a specific backend (allows testing with mock).
#[instrument(
    level = "debug",
    skip(backend, output_dir, config, cancel),
    fields(source = %job.source.display(), edit = %job.request.edit_type)
)]
pub fn run_edit_with(
    backend: &impl FilterBackend,
    job: &EditJob,
    output_dir: &Path,
    config: &EditorConfig,
    cancel: &CancelToken,
) -> Result<EditRecord, ProcessError> {
    let (bytes, upload) = load_upload(&job.source, &config.uploads)?;
    let request = &job.request;

    let pipeline_err = |source: PipelineError| ProcessError::Pipeline {
        path: job.source.clone(),
        source,
    };
    let steps: Vec<String> = chain::plan(request.edit_type, request.factor())
        .iter()
        .map(ToString::to_string)
        .collect();
    let image = upload.image.to_rgb8();
    let edited = pipeline::process_request(backend, image, request, cancel);
    let edited = edited.map_err(pipeline_err)?;

    let format = config.output.format;
    let encoded = codec::encode(&edited, format, config.output.quality())
        .map_err(|e| pipeline_err(PipelineError::Encode(e)))?;

    let id = naming::edit_id(&bytes, request);
    let output = naming::edited_filename(&upload.stem, request.edit_type, &id, format);
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join(&output), &encoded)?;

    info!(output = %output, bytes = encoded.len(), "Edit written");
    Ok(EditRecord {
        source: job.source.display().to_string(),
        output,
        edit_type: request.edit_type,
        intensity: request.intensity,
        id,
        dimensions: edited.dimensions(),
        steps,
        bytes: encoded.len() as u64,
    })
}

/// Write a fit-inside JPEG thumbnail of `source`.
#[instrument(level = "debug", skip(output_dir, config), fields(source = %source.display()))]
pub fn run_thumbnail(
    source: &Path,
    output_dir: &Path,
    config: &EditorConfig,
) -> Result<ThumbnailRecord, ProcessError> {
    let (_, upload) = load_upload(source, &config.uploads)?;

    let thumb = codec::thumbnail(&upload.image, config.thumbnails.bounds());
    let encoded = codec::encode(&thumb, OutputFormat::Jpeg, config.thumbnails.quality())?;

    let output = naming::thumbnail_filename(&upload.stem);
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join(&output), &encoded)?;

    info!(output = %output, "Thumbnail written");
    Ok(ThumbnailRecord {
        source: source.display().to_string(),
        output,
        dimensions: thumb.dimensions(),
        bytes: encoded.len() as u64,
    })
}

/// Validate a file on disk the same way uploads are validated.
pub fn check_file(source: &Path, config: &UploadsConfig) -> Result<ValidatedUpload, ProcessError> {
    load_upload(source, config).map(|(_, upload)| upload)
}

/// Read and validate `path`, returning its raw bytes alongside the upload.
///
/// Name and on-disk size are checked before anything is read, and the read
/// itself stops one byte past the limit in case the file grows meanwhile.
fn load_upload(
    path: &Path,
    config: &UploadsConfig,
) -> Result<(Vec<u8>, ValidatedUpload), ProcessError> {
    let upload_err = |source: UploadError| ProcessError::Upload {
        path: path.to_path_buf(),
        source,
    };
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    check_filename(&filename, config).map_err(upload_err)?;
    let size = fs::metadata(path)?.len();
    check_size(size, config).map_err(upload_err)?;

    let mut bytes = Vec::with_capacity(size as usize);
    File::open(path)?
        .take(config.max_bytes + 1)
        .read_to_end(&mut bytes)?;
    let upload = validate_upload(&filename, &bytes, config).map_err(upload_err)?;
    Ok((bytes, upload))
}

/// Find every file under `dir` whose extension the upload rules accept.
///
/// Hidden entries and anything under `exclude` (usually the output
/// directory) are skipped, so a re-run never edits its own outputs.
/// Results are sorted by path.
pub fn collect_images(
    dir: &Path,
    exclude: &Path,
    config: &UploadsConfig,
) -> Result<Vec<PathBuf>, ProcessError> {
    let exclude = exclude.canonicalize().ok();
    let mut images = Vec::new();

    let walker = WalkDir::new(dir).sort_by_file_name().into_iter();
    for entry in walker.filter_entry(|e| {
        let hidden = e.depth() > 0 && e.file_name().to_string_lossy().starts_with('.');
        let excluded = match (&exclude, e.path().canonicalize()) {
            (Some(ex), Ok(path)) => path.starts_with(ex),
            _ => false,
        };
        !hidden && !excluded
    }) {
        let entry = entry.map_err(|e| ProcessError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let allowed = entry
            .path()
            .extension()
            .map(|ext| config.allows(&ext.to_string_lossy()))
            .unwrap_or(false);
        if allowed {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// Edit every supported image under `dir` in parallel.
pub fn run_batch(
    dir: &Path,
    request: EditRequest,
    output_dir: &Path,
    config: &EditorConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchResult, ProcessError> {
    run_batch_with(
        &RustBackend::new(),
        dir,
        request,
        output_dir,
        config,
        progress,
        &CancelToken::new(),
    )
}

/// Batch edit using a specific backend (allows testing with mock).
#[instrument(
    skip(backend, output_dir, config, progress, cancel),
    fields(dir = %dir.display(), edit = %request.edit_type)
)]
pub fn run_batch_with(
    backend: &impl FilterBackend,
    dir: &Path,
    request: EditRequest,
    output_dir: &Path,
    config: &EditorConfig,
    progress: Option<Sender<ProcessEvent>>,
    cancel: &CancelToken,
) -> Result<BatchResult, ProcessError> {
    let sources = collect_images(dir, output_dir, &config.uploads)?;
    if sources.is_empty() {
        return Err(ProcessError::NoImages(dir.to_path_buf()));
    }
    fs::create_dir_all(output_dir)?;

    let send = |event: ProcessEvent| {
        if let Some(tx) = &progress {
            // Receiver gone means nobody is listening; the batch carries on
            let _ = tx.send(event);
        }
    };
    send(ProcessEvent::BatchStarted {
        total: sources.len(),
        request,
    });

    let outcomes: Vec<(PathBuf, Result<EditRecord, ProcessError>)> = sources
        .into_par_iter()
        .enumerate()
        .map(|(index, source)| {
            let job = EditJob {
                source: source.clone(),
                request,
            };
            let outcome = run_edit_with(backend, &job, output_dir, config, cancel);
            match &outcome {
                Ok(record) => send(ProcessEvent::EditFinished {
                    index: index + 1,
                    record: record.clone(),
                }),
                Err(e) => {
                    warn!(source = %source.display(), error = %e, "Edit failed");
                    send(ProcessEvent::EditFailed {
                        index: index + 1,
                        source: source.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
            (source, outcome)
        })
        .collect();

    let mut result = BatchResult::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(record) => result.records.push(record),
            Err(e) => result.failures.push(BatchFailure {
                source: source.display().to_string(),
                error: e.to_string(),
            }),
        }
    }
    let (edited, failed) = (result.records.len(), result.failures.len());
    info!(edited, failed, "Batch complete");
    Ok(result)
}

/// Write `records` as pretty JSON to `manifest.json` in `output_dir`.
pub fn write_manifest(output_dir: &Path, records: &[EditRecord]) -> Result<PathBuf, ProcessError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(MANIFEST_FILENAME);
    fs::write(&path, serde_json::to_string_pretty(records)?)?;
    Ok(path)
}
