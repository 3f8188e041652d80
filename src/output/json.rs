//! JSON output format writer.

use crate::error::{Error, Result};
use crate::output::{DetectionRow, OutputWriter, RunMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON result file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResultFile {
    /// When the file was written.
    pub generated_at: DateTime<Utc>,
    /// Run settings.
    pub metadata: RunMetadata,
    /// Detection rows, in output order.
    pub detections: Vec<DetectionRow>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Total number of detections.
    pub total_detections: usize,
    /// Number of distinct images with a detection.
    pub images_with_detections: usize,
    /// Detection count per class name.
    pub classes: BTreeMap<String, usize>,
}

/// Writer for JSON detection output files.
pub struct JsonResultWriter {
    detections: Vec<DetectionRow>,
    output_path: PathBuf,
    metadata: RunMetadata,
}

impl JsonResultWriter {
    /// Create a new JSON result writer.
    pub fn new(output_path: &Path, metadata: RunMetadata) -> Self {
        Self {
            detections: Vec::new(),
            output_path: output_path.to_path_buf(),
            metadata,
        }
    }

    fn compute_summary(&self) -> JsonSummary {
        let images: HashSet<&str> = self
            .detections
            .iter()
            .map(|d| d.file_name.as_str())
            .collect();

        let mut classes = BTreeMap::new();
        for d in &self.detections {
            *classes.entry(d.name.clone()).or_insert(0) += 1;
        }

        JsonSummary {
            total_detections: self.detections.len(),
            images_with_detections: images.len(),
            classes,
        }
    }
}

impl OutputWriter for JsonResultWriter {
    fn write_header(&mut self) -> Result<()> {
        // Written whole at finalize.
        Ok(())
    }

    fn write_detection(&mut self, detection: &DetectionRow) -> Result<()> {
        self.detections.push(detection.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let summary = self.compute_summary();
        let result = JsonResultFile {
            generated_at: Utc::now(),
            metadata: self.metadata.clone(),
            detections: std::mem::take(&mut self.detections),
            summary,
        };

        let file = File::create(&self.output_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &result).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::RawDetection;
    use crate::manifest::ManifestRow;
    use tempfile::tempdir;

    fn detection(file: &str, class: u32, name: &str) -> DetectionRow {
        let raw = RawDetection {
            x_center: 0.5,
            y_center: 0.5,
            width: 0.2,
            height: 0.2,
            confidence: 0.9,
            class: 0,
        };
        DetectionRow::labeled(&raw, &ManifestRow::new(file, class, name))
    }

    fn metadata() -> RunMetadata {
        RunMetadata {
            detector: "replay".to_string(),
            manifest: Some("manifest.csv".to_string()),
            image_root: "/data/images".to_string(),
            batch_size: 16,
            min_confidence: Some(0.2),
        }
    }

    #[test]
    fn test_json_writer_basic() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("detections.json");

        let mut writer = JsonResultWriter::new(&output_path, metadata());
        writer.write_header().expect("write header");
        writer
            .write_detection(&detection("a.jpg", 7, "lion"))
            .expect("write detection");
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let result: JsonResultFile = serde_json::from_str(&content).expect("parse JSON");

        assert_eq!(result.metadata.detector, "replay");
        assert_eq!(result.metadata.batch_size, 16);
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].name, "lion");
        assert_eq!(result.summary.total_detections, 1);
    }

    #[test]
    fn test_json_summary_counts() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("detections.json");

        let mut writer = JsonResultWriter::new(&output_path, metadata());
        for d in [
            detection("a.jpg", 7, "lion"),
            detection("a.jpg", 7, "lion"),
            detection("b.jpg", 3, "zebra"),
        ] {
            writer.write_detection(&d).expect("write detection");
        }
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let result: JsonResultFile = serde_json::from_str(&content).expect("parse JSON");

        assert_eq!(result.summary.total_detections, 3);
        assert_eq!(result.summary.images_with_detections, 2);
        assert_eq!(result.summary.classes.get("lion"), Some(&2));
        assert_eq!(result.summary.classes.get("zebra"), Some(&1));
    }
}
