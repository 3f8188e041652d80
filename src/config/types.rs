//! Configuration type definitions.

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::inference::ChannelOrder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default run settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Detector settings.
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Manifest rows per batch.
    pub batch_size: usize,

    /// Drop detector boxes below this confidence (None keeps every box).
    pub min_confidence: Option<f32>,

    /// Output formats.
    pub formats: Vec<OutputFormat>,

    /// Output directory (None = current directory).
    pub output_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            min_confidence: None,
            formats: vec![OutputFormat::Csv],
            output_dir: None,
        }
    }
}

/// Detector settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Channel order the detector consumes.
    pub channel_order: ChannelOrder,
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix a UTF-8 BOM to CSV output (for spreadsheet tools).
    pub csv_bom: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flat CSV table.
    Csv,
    /// JSON document with run metadata.
    Json,
    /// Apache Parquet table.
    Parquet,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Parquet => write!(f, "parquet"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" | "pq" => Ok(Self::Parquet),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("csv".parse::<OutputFormat>().ok(), Some(OutputFormat::Csv));
        assert_eq!("JSON".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!(
            "pq".parse::<OutputFormat>().ok(),
            Some(OutputFormat::Parquet)
        );
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Parquet.to_string(), "parquet");
    }

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.batch_size, 16);
        assert_eq!(defaults.min_confidence, None);
        assert_eq!(defaults.formats, vec![OutputFormat::Csv]);
    }

    #[test]
    fn test_detector_channel_order_from_toml() {
        let config: Config = toml::from_str("[detector]\nchannel_order = \"bgr\"\n").unwrap();
        assert_eq!(config.detector.channel_order, ChannelOrder::Bgr);
    }
}
