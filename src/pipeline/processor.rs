//! Whole-manifest processing pipeline.

use crate::batch::partition;
use crate::error::{Error, Result};
use crate::inference::{BatchOptions, Detector, run_batch};
use crate::manifest::ManifestRow;
use crate::output::{AggregateResult, progress};
use crate::pipeline::Aggregator;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// Settings for one detection run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Rows per batch.
    pub batch_size: usize,
    /// Opt-in threshold; `None` keeps every box the detector returns.
    pub min_confidence: Option<f32>,
    /// Abort on the first failed batch instead of dropping it.
    pub fail_fast: bool,
    /// Show a batch progress bar.
    pub progress_enabled: bool,
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Batches attempted.
    pub batches: usize,
    /// Batches dropped because the detector failed.
    pub batches_failed: usize,
    /// Manifest rows processed.
    pub rows: usize,
    /// Rows whose image could not be decoded.
    pub decode_failures: usize,
    /// Decoded rows without any kept detection.
    pub empty_images: usize,
    /// Detection rows in the aggregate.
    pub detections: usize,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
}

/// Result of [`run_manifest`].
#[derive(Debug)]
pub struct RunOutput {
    /// Aggregated detections.
    pub result: AggregateResult,
    /// Run counters.
    pub summary: RunSummary,
}

/// Run every manifest row through `detector` and aggregate the results.
///
/// Rows are partitioned into batches of `options.batch_size` and processed
/// in order. A batch whose detector call fails is logged and dropped; with
/// `options.fail_fast` the error is returned instead.
///
/// # Errors
///
/// Returns [`Error::Access`] if `image_root` is not a readable directory and
/// [`Error::Config`] for an invalid batch size.
pub fn run_manifest(
    rows: &[ManifestRow],
    image_root: &Path,
    detector: &mut dyn Detector,
    options: &RunOptions,
) -> Result<RunOutput> {
    let start_time = Instant::now();

    let meta = std::fs::metadata(image_root).map_err(|e| Error::Access {
        path: image_root.to_path_buf(),
        source: e,
    })?;
    if !meta.is_dir() {
        return Err(Error::Access {
            path: image_root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let batches = partition(rows, options.batch_size)?;
    let total_batches = batches.len();
    info!(
        "Running {} on {} rows in {} batch(es) of up to {}",
        detector.name(),
        rows.len(),
        total_batches,
        options.batch_size
    );

    let batch_options = BatchOptions {
        min_confidence: options.min_confidence,
    };
    let pb = progress::create_batch_progress(total_batches, options.progress_enabled);

    let mut aggregator = Aggregator::new();
    let mut summary = RunSummary {
        batches: total_batches,
        rows: rows.len(),
        ..RunSummary::default()
    };

    for batch in batches {
        match run_batch(&batch, image_root, detector, &batch_options) {
            Ok(outcome) => {
                summary.decode_failures += outcome.decode_failures();
                summary.empty_images += outcome.empty_images();
                aggregator.push(outcome.index, outcome.result);
            }
            Err(e) if options.fail_fast => {
                progress::finish_progress(pb, "Aborted");
                return Err(e);
            }
            Err(e) => {
                error!("Batch {} failed, dropping {} rows: {e}", batch.index + 1, batch.len());
                summary.batches_failed += 1;
                aggregator.mark_failed(batch.index);
            }
        }
        progress::inc_progress(pb.as_ref());
    }
    progress::finish_progress(pb, "Inference complete");

    let result = aggregator.finish();
    summary.detections = result.len();
    summary.duration_secs = start_time.elapsed().as_secs_f64();

    info!(
        "Found {} detections in {} images ({} unreadable, {} without detections) in {:.2}s",
        summary.detections,
        result.image_count(),
        summary.decode_failures,
        summary.empty_images,
        summary.duration_secs
    );
    if summary.batches_failed > 0 {
        debug!("{} of {} batches failed", summary.batches_failed, summary.batches);
    }

    Ok(RunOutput { result, summary })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::{ImageFrame, RawDetection};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    /// Returns one box per frame; fails on frames named in `fail_on`.
    struct FixedDetector {
        fail_on: Option<String>,
    }

    impl Detector for FixedDetector {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&mut self, frame: &ImageFrame) -> Result<Vec<RawDetection>> {
            if self.fail_on.as_deref() == Some(frame.source.as_str()) {
                return Err(Error::Detector {
                    reason: "boom".to_string(),
                });
            }
            Ok(vec![RawDetection::from_top_left([0.1, 0.1, 0.2, 0.2], 0.9, 1)])
        }
    }

    fn setup(names: &[&str]) -> (TempDir, Vec<ManifestRow>) {
        let dir = TempDir::new().unwrap();
        for name in names {
            RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let rows = names
            .iter()
            .map(|n| ManifestRow::new(*n, 7, "lion"))
            .collect();
        (dir, rows)
    }

    fn options(fail_fast: bool) -> RunOptions {
        RunOptions {
            batch_size: 2,
            min_confidence: None,
            fail_fast,
            progress_enabled: false,
        }
    }

    #[test]
    fn test_run_manifest_counts() {
        let (dir, rows) = setup(&["a.png", "b.png", "c.png"]);
        let mut detector = FixedDetector { fail_on: None };

        let out = run_manifest(&rows, dir.path(), &mut detector, &options(false)).unwrap();
        assert_eq!(out.summary.batches, 2);
        assert_eq!(out.summary.detections, 3);
        assert_eq!(out.result.image_count(), 3);
    }

    #[test]
    fn test_failed_batch_is_dropped() {
        let (dir, rows) = setup(&["a.png", "b.png", "c.png"]);
        let mut detector = FixedDetector {
            fail_on: Some("b.png".to_string()),
        };

        let out = run_manifest(&rows, dir.path(), &mut detector, &options(false)).unwrap();
        assert_eq!(out.summary.batches_failed, 1);
        let files: Vec<_> = out.result.rows().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(files, ["c.png"]);
    }

    #[test]
    fn test_fail_fast_returns_error() {
        let (dir, rows) = setup(&["a.png", "b.png"]);
        let mut detector = FixedDetector {
            fail_on: Some("a.png".to_string()),
        };

        let err = run_manifest(&rows, dir.path(), &mut detector, &options(true)).unwrap_err();
        assert!(matches!(err, Error::Detector { .. }));
    }

    #[test]
    fn test_missing_image_root_is_access_error() {
        let dir = TempDir::new().unwrap();
        let mut detector = FixedDetector { fail_on: None };
        let err = run_manifest(
            &[ManifestRow::new("a.png", 1, "x")],
            &dir.path().join("missing"),
            &mut detector,
            &options(false),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Access { .. }));
    }

    #[test]
    fn test_zero_batch_size_is_config_error() {
        let (dir, rows) = setup(&["a.png"]);
        let mut detector = FixedDetector { fail_on: None };
        let mut opts = options(false);
        opts.batch_size = 0;
        let err = run_manifest(&rows, dir.path(), &mut detector, &opts).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
