//! Output type definitions.

use crate::inference::RawDetection;
use crate::manifest::{ClassCode, ManifestRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One predicted box for one image, labeled from the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRow {
    /// Box center x, as a fraction of image width.
    pub x_center: f32,
    /// Box center y, as a fraction of image height.
    pub y_center: f32,
    /// Box width, as a fraction of image width.
    pub width: f32,
    /// Box height, as a fraction of image height.
    pub height: f32,
    /// Detector confidence.
    pub confidence: f32,
    /// Class code from the manifest.
    pub class: ClassCode,
    /// Class name from the manifest.
    pub name: String,
    /// Manifest-relative path of the source image.
    pub file_name: String,
}

impl DetectionRow {
    /// Label a detector box with the manifest's class for its image.
    ///
    /// Only the box geometry and confidence come from the detector; the
    /// detector's own class guess is discarded. Coordinates are clamped to
    /// `[0, 1]`.
    pub fn labeled(raw: &RawDetection, row: &ManifestRow) -> Self {
        Self {
            x_center: raw.x_center.clamp(0.0, 1.0),
            y_center: raw.y_center.clamp(0.0, 1.0),
            width: raw.width.clamp(0.0, 1.0),
            height: raw.height.clamp(0.0, 1.0),
            confidence: raw.confidence,
            class: row.class,
            name: row.type_name.clone(),
            file_name: row.image_path_rel.clone(),
        }
    }
}

/// Detections produced by one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    /// At least one detection.
    Detections(Vec<DetectionRow>),
    /// No row in the batch produced a detection.
    Empty,
}

impl BatchResult {
    /// Wrap rows, mapping an empty vector to [`BatchResult::Empty`].
    pub fn from_rows(rows: Vec<DetectionRow>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Detections(rows)
        }
    }

    /// Number of detection rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Detections(rows) => rows.len(),
            Self::Empty => 0,
        }
    }

    /// Whether this is the empty marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// All detections of a run, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    /// At least one detection.
    Detections(Vec<DetectionRow>),
    /// The run finished without any detection.
    NoDetections,
}

impl AggregateResult {
    /// Wrap rows, mapping an empty vector to [`AggregateResult::NoDetections`].
    pub fn from_rows(rows: Vec<DetectionRow>) -> Self {
        if rows.is_empty() {
            Self::NoDetections
        } else {
            Self::Detections(rows)
        }
    }

    /// Detection rows (empty slice for `NoDetections`).
    pub fn rows(&self) -> &[DetectionRow] {
        match self {
            Self::Detections(rows) => rows,
            Self::NoDetections => &[],
        }
    }

    /// Number of detection rows.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Whether the run detected nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoDetections)
    }

    /// Number of distinct images with at least one detection.
    pub fn image_count(&self) -> usize {
        self.rows()
            .iter()
            .map(|r| r.file_name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Run settings recorded alongside the results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Detector name.
    pub detector: String,
    /// Manifest the run was driven by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Root the manifest paths are relative to.
    pub image_root: String,
    /// Rows per batch.
    pub batch_size: usize,
    /// Confidence threshold applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn raw(class: u32) -> RawDetection {
        RawDetection {
            x_center: 0.5,
            y_center: 0.4,
            width: 0.2,
            height: 0.3,
            confidence: 0.88,
            class,
        }
    }

    #[test]
    fn test_labeled_overrides_detector_class() {
        let row = ManifestRow::new("x.jpg", 7, "lion");
        let det = DetectionRow::labeled(&raw(2), &row);

        assert_eq!(det.class, 7);
        assert_eq!(det.name, "lion");
        assert_eq!(det.file_name, "x.jpg");
        assert_eq!(det.confidence, 0.88);
    }

    #[test]
    fn test_labeled_clamps_coordinates() {
        let mut r = raw(1);
        r.x_center = 1.02;
        r.width = -0.01;
        let det = DetectionRow::labeled(&r, &ManifestRow::new("a.jpg", 1, "animal"));
        assert_eq!(det.x_center, 1.0);
        assert_eq!(det.width, 0.0);
    }

    #[test]
    fn test_batch_result_from_empty_rows_is_marker() {
        assert_eq!(BatchResult::from_rows(Vec::new()), BatchResult::Empty);
        assert!(BatchResult::Empty.is_empty());
    }

    #[test]
    fn test_aggregate_image_count() {
        let a = DetectionRow::labeled(&raw(1), &ManifestRow::new("a.jpg", 1, "lion"));
        let b = DetectionRow::labeled(&raw(1), &ManifestRow::new("b.jpg", 1, "lion"));
        let result = AggregateResult::from_rows(vec![a.clone(), a, b]);
        assert_eq!(result.len(), 3);
        assert_eq!(result.image_count(), 2);
        assert_eq!(AggregateResult::from_rows(Vec::new()).image_count(), 0);
    }
}
