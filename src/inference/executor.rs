//! Per-batch inference.

use crate::batch::Batch;
use crate::error::{Error, Result};
use crate::imaging::load_frame;
use crate::inference::Detector;
use crate::output::{BatchResult, DetectionRow};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Settings applied to every batch of a run.
///
/// The default keeps every box the detector returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Opt-in threshold: boxes below this confidence are discarded.
    pub min_confidence: Option<f32>,
}

/// Why a manifest row contributed nothing to its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    /// The image could not be opened or decoded.
    Decode {
        /// Manifest-relative image path.
        image_path_rel: String,
        /// Decoder message.
        reason: String,
    },
    /// The image decoded but the detector returned no box (or none cleared
    /// the configured threshold).
    NoDetections {
        /// Manifest-relative image path.
        image_path_rel: String,
    },
}

impl RowIssue {
    /// Whether this issue is a decode failure (as opposed to an empty image).
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Everything one batch produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Index of the batch in the run.
    pub index: usize,
    /// Manifest rows in the batch.
    pub rows_seen: usize,
    /// Detections, or the empty marker.
    pub result: BatchResult,
    /// Rows that contributed nothing, in manifest order.
    pub issues: Vec<RowIssue>,
}

impl BatchOutcome {
    /// Number of rows whose image failed to decode.
    pub fn decode_failures(&self) -> usize {
        self.issues.iter().filter(|i| i.is_decode_failure()).count()
    }

    /// Number of decoded rows without any kept detection.
    pub fn empty_images(&self) -> usize {
        self.issues.len() - self.decode_failures()
    }
}

/// Run one batch through `detector`.
///
/// Images are decoded and converted to the detector's channel order in
/// parallel; detector calls then run one at a time on the calling thread.
/// Unreadable images and images without detections are recorded in
/// [`BatchOutcome::issues`] and never fail the batch. A detector error does:
/// the whole batch is abandoned and the error returned.
pub fn run_batch(
    batch: &Batch<'_>,
    image_root: &Path,
    detector: &mut dyn Detector,
    options: &BatchOptions,
) -> Result<BatchOutcome> {
    let order = detector.channel_order();

    let frames: Vec<_> = batch
        .rows
        .par_iter()
        .map(|row| load_frame(image_root, &row.image_path_rel, order))
        .collect();

    let mut detections = Vec::new();
    let mut issues = Vec::new();

    for (row, frame) in batch.rows.iter().zip(frames) {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                let reason = match &err {
                    Error::ImageDecode { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                warn!(
                    "Failed to load image: {} ({})",
                    image_root.join(&row.image_path_rel).display(),
                    reason
                );
                issues.push(RowIssue::Decode {
                    image_path_rel: row.image_path_rel.clone(),
                    reason,
                });
                continue;
            }
        };

        let kept: Vec<DetectionRow> = detector
            .detect(&frame)?
            .iter()
            .filter(|raw| options.min_confidence.is_none_or(|min| raw.confidence >= min))
            .map(|raw| DetectionRow::labeled(raw, row))
            .collect();

        if kept.is_empty() {
            debug!("No detections for {}", row.image_path_rel);
            issues.push(RowIssue::NoDetections {
                image_path_rel: row.image_path_rel.clone(),
            });
            continue;
        }

        debug!("{} detection(s) for {}", kept.len(), row.image_path_rel);
        detections.extend(kept);
    }

    let result = BatchResult::from_rows(detections);
    info!(
        "Batch {} complete: {} rows, {} detections, {} unreadable",
        batch.index + 1,
        batch.len(),
        result.len(),
        issues.iter().filter(|i| i.is_decode_failure()).count()
    );

    Ok(BatchOutcome {
        index: batch.index,
        rows_seen: batch.len(),
        result,
        issues,
    })
}
