//! CLI argument definitions.

use crate::cli::validators::{parse_batch_size, parse_confidence, parse_duration};
use crate::config::OutputFormat;
use crate::inference::ChannelOrder;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Camera-trap image scanning, batch detection and symlink curation.
#[derive(Debug, Parser)]
#[command(name = "camtrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every file under a directory as absolute paths.
    Scan(ScanArgs),
    /// Run a detector over a labeled manifest and write the detection table.
    Detect(DetectArgs),
    /// Mirror a list of files into a directory of symbolic links.
    Link(LinkArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the scan command.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan recursively.
    pub root: PathBuf,

    /// Write the list to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the detect command.
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Manifest CSV with `image_path_rel`, `class` and `type` columns.
    #[arg(short, long, env = "CAMTRAP_MANIFEST")]
    pub manifest: PathBuf,

    /// Root directory the manifest paths are relative to.
    #[arg(short, long, env = "CAMTRAP_IMAGES")]
    pub images: PathBuf,

    /// Recorded detector output (MegaDetector batch JSON) to replay.
    #[arg(short, long, env = "CAMTRAP_DETECTIONS")]
    pub detections: PathBuf,

    /// Manifest rows per batch.
    #[arg(short, long, value_parser = parse_batch_size, env = "CAMTRAP_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Minimum confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "CAMTRAP_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Output directory (default: current directory).
    #[arg(short, long, env = "CAMTRAP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output formats (comma-separated: csv,json,parquet).
    #[arg(short, long, value_delimiter = ',', env = "CAMTRAP_FORMAT")]
    pub format: Option<Vec<OutputFormat>>,

    /// Channel order the detector expects (rgb or bgr).
    #[arg(long, env = "CAMTRAP_CHANNEL_ORDER")]
    pub channel_order: Option<ChannelOrder>,

    /// Stop on the first failed batch.
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not show the batch progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the link command.
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// File with one source path per line.
    pub list: PathBuf,

    /// Destination directory for the links.
    pub destination: PathBuf,

    /// Remove a destination lock older than this (e.g. 30m, 1h).
    #[arg(long, value_parser = parse_duration)]
    pub stale_lock_timeout: Option<Duration>,
}
