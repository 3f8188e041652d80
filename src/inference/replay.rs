//! Detector backed by a recorded MegaDetector batch-output file.
//!
//! MegaDetector's batch runner writes a JSON document listing, per image,
//! the boxes it found:
//!
//! ```json
//! {
//!   "images": [
//!     {"file": "site1/IMG_0001.JPG",
//!      "detections": [{"category": "1", "conf": 0.93, "bbox": [0.1, 0.2, 0.3, 0.4]}]}
//!   ],
//!   "detection_categories": {"1": "animal", "2": "person", "3": "vehicle"}
//! }
//! ```
//!
//! Boxes are `[x_min, y_min, width, height]` as fractions of the image size.

use crate::error::{Error, Result};
use crate::inference::{ChannelOrder, Detector, ImageFrame, RawDetection};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct BatchOutputFile {
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    file: String,
    #[serde(default)]
    detections: Option<Vec<BoxEntry>>,
    #[serde(default)]
    failure: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoxEntry {
    #[serde(deserialize_with = "category_code")]
    category: u32,
    conf: f32,
    bbox: [f32; 4],
}

/// Categories are strings ("1") in MegaDetector output; accept bare numbers too.
fn category_code<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid category '{s}'"))),
    }
}

/// Replays recorded detections keyed by image path.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    channel_order: ChannelOrder,
    by_file: HashMap<String, Vec<RawDetection>>,
    failures: HashMap<String, String>,
}

impl ReplayDetector {
    /// Load a MegaDetector batch-output JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::DetectionsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let detector = Self::from_json(&contents).map_err(|e| Error::DetectionsParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            "Loaded recorded detections for {} images ({} recorded failures) from {}",
            detector.len(),
            detector.failures.len(),
            path.display()
        );

        Ok(detector)
    }

    /// Parse a MegaDetector batch-output JSON document.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let parsed: BatchOutputFile = serde_json::from_str(json)?;

        let mut by_file = HashMap::with_capacity(parsed.images.len());
        let mut failures = HashMap::new();

        for image in parsed.images {
            let key = normalize_key(&image.file);
            if let Some(reason) = image.failure {
                failures.insert(key, reason);
                continue;
            }
            let boxes = image
                .detections
                .unwrap_or_default()
                .into_iter()
                .map(|b| RawDetection::from_top_left(b.bbox, b.conf, b.category))
                .collect();
            by_file.insert(key, boxes);
        }

        Ok(Self {
            channel_order: ChannelOrder::default(),
            by_file,
            failures,
        })
    }

    /// Declare the channel order frames should be converted to.
    #[must_use]
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    /// Number of images with recorded results (including failures).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.by_file.len() + self.failures.len()
    }
}

impl Detector for ReplayDetector {
    fn name(&self) -> &str {
        "megadetector-replay"
    }

    fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    fn detect(&mut self, frame: &ImageFrame) -> Result<Vec<RawDetection>> {
        let key = normalize_key(&frame.source);

        if let Some(boxes) = self.by_file.get(&key) {
            return Ok(boxes.clone());
        }

        if let Some(reason) = self.failures.get(&key) {
            warn!("Recorded run failed on {}: {}", frame.source, reason);
        } else {
            debug!("No recorded detections for {}", frame.source);
        }
        Ok(Vec::new())
    }
}

/// Normalize a path to forward slashes without a leading `./`.
fn normalize_key(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified.trim_start_matches("./").to_string()
}
