use clap::{Parser, Subcommand};
use snapedit::request::{EditRequest, EditType, Intensity};
use snapedit::{config, output, process};
use std::path::PathBuf;

/// Shared flags for commands that run an edit.
#[derive(clap::Args, Clone)]
struct EditArgs {
    /// Edit to apply: enhance, restore, retouch, style, background, colorize
    #[arg(long, short)]
    edit: EditType,

    /// Strength 0-100 (default from config, stock 50)
    #[arg(long, short, value_parser = clap::value_parser!(i32).range(0..=100))]
    intensity: Option<i32>,
}

impl EditArgs {
    fn request(&self, config: &config::EditorConfig) -> EditRequest {
        let intensity = self
            .intensity
            .unwrap_or(config.edits.default_intensity);
        EditRequest {
            edit_type: self.edit,
            intensity: Intensity(intensity),
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("SNAPEDIT_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SNAPEDIT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "snapedit")]
#[command(about = "Deterministic photo edits at a chosen intensity")]
#[command(long_about = "\
Deterministic photo edits at a chosen intensity

Six edits, each a fixed chain of filter steps whose strength scales with
--intensity (0-100):

  enhance      contrast, brightness, sharpness, saturation
  restore      median denoise, sharpness, contrast; unsharp mask above 50
  retouch      soft blur, slight brightening, lower contrast
  style        edge-enhance or smooth, switching at 40 and 70
  background   blurred centre fading to the sharp original
  colorize     strong saturation, contrast, brightness

The same file, edit and intensity always produce the same output and the
same output filename:

  edited/
  ├── dawn_edited_restore_3fa9c01b.jpg
  ├── dawn_thumb.jpg
  └── manifest.json                  # batch runs

Set RUST_LOG=debug to trace every filter step on stderr.

Run 'snapedit edits' to list every step, and 'snapedit gen-config' for a
documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "edited", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one edit to one image
    Apply {
        input: PathBuf,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Apply one edit to every supported image under a directory
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        edit: EditArgs,
        /// Skip writing manifest.json
        #[arg(long)]
        no_manifest: bool,
    },
    /// Write a small JPEG preview of an image
    Thumbnail {
        input: PathBuf,
    },
    /// Validate an image as an upload without editing it
    Check {
        input: PathBuf,
    },
    /// List the edit types and their filter steps
    Edits,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply { input, edit } => {
            let editor_config = config::load_config(&cli.config_dir)?;
            let job = process::EditJob {
                source: input,
                request: edit.request(&editor_config),
            };
            let record = process::run_edit(&job, &cli.output_dir, &editor_config)?;
            output::print_edit_record(&record);
        }
        Command::Batch {
            dir,
            edit,
            no_manifest,
        } => {
            let editor_config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&editor_config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run_batch(
                &dir,
                edit.request(&editor_config),
                &cli.output_dir,
                &editor_config,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let result = result?;

            let manifest = if no_manifest {
                None
            } else {
                Some(process::write_manifest(&cli.output_dir, &result.records)?)
            };
            output::print_batch_summary(&result, manifest.as_deref());
            if !result.failures.is_empty() {
                return Err(format!("{} edit(s) failed", result.failures.len()).into());
            }
        }
        Command::Thumbnail { input } => {
            let editor_config = config::load_config(&cli.config_dir)?;
            let record = process::run_thumbnail(&input, &cli.output_dir, &editor_config)?;
            output::print_thumbnail_record(&record);
        }
        Command::Check { input } => {
            let editor_config = config::load_config(&cli.config_dir)?;
            let bytes = std::fs::metadata(&input)?.len();
            let upload = process::check_file(&input, &editor_config.uploads)?;
            output::print_check(&input, bytes, &upload);
        }
        Command::Edits => {
            output::print_chain_table();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Structured logs go to stderr so stdout stays the CLI output.
///
/// `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
