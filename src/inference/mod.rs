//! Detector abstraction and per-batch inference.
//!
//! The detection model is an external collaborator. Anything that can turn
//! an [`ImageFrame`] into normalized boxes implements [`Detector`]; the
//! executor owns decoding, channel conversion, thresholding and the label
//! override, so backends stay small.

mod executor;
mod replay;

pub use executor::{BatchOptions, BatchOutcome, RowIssue, run_batch};
pub use replay::ReplayDetector;

use crate::error::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Interleaved channel order a detector consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red (OpenCV convention).
    Bgr,
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgb => write!(f, "rgb"),
            Self::Bgr => write!(f, "bgr"),
        }
    }
}

impl std::str::FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "bgr" => Ok(Self::Bgr),
            other => Err(format!("unknown channel order: {other}")),
        }
    }
}

/// A decoded image ready for a detector.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    /// Manifest-relative path of the source image.
    pub source: String,
    /// Channel order of `pixels`.
    pub order: ChannelOrder,
    /// 8-bit, 3-channel pixels laid out in `order`.
    pub pixels: RgbImage,
}

/// One box as reported by a detector.
///
/// Coordinates are fractions of the image size, box given by its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    /// Box center x.
    pub x_center: f32,
    /// Box center y.
    pub y_center: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Detector confidence.
    pub confidence: f32,
    /// Detector's own class guess.
    pub class: u32,
}

impl RawDetection {
    /// Build from a top-left anchored box (`[x_min, y_min, width, height]`).
    pub fn from_top_left(bbox: [f32; 4], confidence: f32, class: u32) -> Self {
        let [x_min, y_min, width, height] = bbox;
        Self {
            x_center: x_min + width / 2.0,
            y_center: y_min + height / 2.0,
            width,
            height,
            confidence,
            class,
        }
    }
}

/// An object detector.
///
/// Detectors are usually stateful and not thread-safe, so `detect` takes
/// `&mut self`; callers hand the executor an owned handle instead of
/// sharing one instance across threads.
pub trait Detector {
    /// Short name used in logs and output metadata.
    fn name(&self) -> &str;

    /// Channel order this detector expects.
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    /// Run detection on one frame. An empty vector means nothing was found.
    fn detect(&mut self, frame: &ImageFrame) -> Result<Vec<RawDetection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn channel_order(&self) -> ChannelOrder {
        (**self).channel_order()
    }

    fn detect(&mut self, frame: &ImageFrame) -> Result<Vec<RawDetection>> {
        (**self).detect(frame)
    }
}
