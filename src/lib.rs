//! Camtrap - camera-trap image pipeline CLI tool.
//!
//! This crate scans image trees, runs object detectors over labeled
//! manifests in batches, aggregates the detections into one table and
//! curates image subsets as directories of symbolic links.

#![warn(missing_docs)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod curation;
pub mod error;
pub mod imaging;
pub mod inference;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod scan;

use clap::Parser;
use cli::{Cli, Command, DetectArgs, LinkArgs, ScanArgs};
use config::{
    Config, config_file_path, load_default_config, save_default_config, validate_batch_size,
    validate_config, validate_formats, validate_min_confidence,
};
use curation::SyncOptions;
use inference::{Detector, ReplayDetector};
use output::RunMetadata;
use pipeline::{RunOptions, run_manifest, write_outputs};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for camtrap CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    // Remove destination locks on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        curation::release_held_locks();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let config = load_default_config()?;

    match cli.command {
        Command::Scan(args) => handle_scan(&args),
        Command::Detect(args) => handle_detect(&args, &config, cli.quiet),
        Command::Link(args) => handle_link(&args),
        Command::Config { action } => handle_config_command(action),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Logs go to stderr so `scan` output on stdout stays pipeable.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// List files under a root, to stdout or a file.
fn handle_scan(args: &ScanArgs) -> Result<()> {
    let report = scan::scan_files(&args.root)?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| Error::Access {
                path: path.clone(),
                source: e,
            })?;
            let mut out = BufWriter::new(file);
            for file in &report.files {
                writeln!(out, "{}", file.display())?;
            }
            out.flush()?;
            info!("Wrote {} paths to {}", report.files.len(), path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            for file in &report.files {
                writeln!(out, "{}", file.display())?;
            }
            out.flush()?;
        }
    }

    info!(
        "Found {} file(s) under {}",
        report.files.len(),
        args.root.display()
    );
    if !report.skipped.is_empty() {
        warn!("{} unreadable entries skipped", report.skipped.len());
    }

    Ok(())
}

/// Run a detector over a manifest and write the aggregate table.
fn handle_detect(args: &DetectArgs, config: &Config, quiet: bool) -> Result<()> {
    let batch_size = args.batch_size.unwrap_or(config.defaults.batch_size);
    let min_confidence = args.min_confidence.or(config.defaults.min_confidence);
    let formats = args
        .format
        .clone()
        .unwrap_or_else(|| config.defaults.formats.clone());
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.defaults.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let channel_order = args
        .channel_order
        .unwrap_or(config.detector.channel_order);

    // Validate resolved values only.
    validate_batch_size(batch_size)?;
    if let Some(min_confidence) = min_confidence {
        validate_min_confidence(min_confidence)?;
    }
    validate_formats(&formats)?;

    info!("Loading manifest: {}", args.manifest.display());
    let rows = manifest::read_manifest(&args.manifest)?;
    info!("Manifest has {} row(s)", rows.len());

    let mut detector =
        ReplayDetector::from_path(&args.detections)?.with_channel_order(channel_order);

    let options = RunOptions {
        batch_size,
        min_confidence,
        fail_fast: args.fail_fast,
        progress_enabled: !quiet && !args.no_progress,
    };
    let run = run_manifest(&rows, &args.images, &mut detector, &options)?;

    let metadata = RunMetadata {
        detector: detector.name().to_string(),
        manifest: Some(args.manifest.display().to_string()),
        image_root: args.images.display().to_string(),
        batch_size,
        min_confidence,
    };
    let written = write_outputs(
        &run.result,
        &output_dir,
        &formats,
        &metadata,
        config.output.csv_bom,
    )?;

    info!(
        "Complete: {} rows, {} batches ({} failed), {} detections, {} file(s) written in {:.2}s",
        run.summary.rows,
        run.summary.batches,
        run.summary.batches_failed,
        run.summary.detections,
        written.len(),
        run.summary.duration_secs
    );

    if run.summary.batches_failed > 0 {
        warn!("{} batch(es) failed and were dropped", run.summary.batches_failed);
    }

    Ok(())
}

/// Sync a list of files into a link directory.
fn handle_link(args: &LinkArgs) -> Result<()> {
    let files = manifest::read_file_list(&args.list)?;
    info!("Read {} path(s) from {}", files.len(), args.list.display());

    let options = SyncOptions {
        stale_lock_after: args.stale_lock_timeout,
    };
    let report = curation::sync_symlinks_with(&files, &args.destination, &options)?;

    for missing in &report.missing {
        warn!("Source not found: {}", missing.display());
    }
    info!(
        "Complete: {} link(s) created ({} replaced), {} missing",
        report.created,
        report.replaced,
        report.missing.len()
    );

    Ok(())
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            if let Err(e) = validate_config(&config) {
                warn!("Configuration is invalid: {e}");
            }
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
