//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "camtrap";

/// Default number of manifest rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Maximum allowed batch size.
///
/// Every decoded image of a batch is held in memory at once, so very large
/// batches of full-resolution camera-trap frames exhaust RAM quickly.
pub const MAX_BATCH_SIZE: usize = 4096;

/// Lock file placed in a symlink destination while a sync is running.
pub const SYNC_LOCK_FILE: &str = ".camtrap-sync.lock";

/// Manifest column names.
pub mod manifest_columns {
    /// Image path relative to the image root.
    pub const IMAGE_PATH: &str = "image_path_rel";
    /// Class code.
    pub const CLASS: &str = "class";
    /// Class (type) name.
    pub const TYPE: &str = "type";
}

/// Output file names by format.
pub mod output_filenames {
    /// CSV output file.
    pub const CSV: &str = "detections.csv";
    /// JSON output file.
    pub const JSON: &str = "detections.json";
    /// Parquet output file.
    pub const PARQUET: &str = "detections.parquet";
}

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places for confidence formatting.
    pub const DECIMAL_PLACES: usize = 4;
}

/// Decimal places for normalized box coordinates.
pub const COORD_DECIMAL_PLACES: usize = 6;

/// UTF-8 Byte Order Mark for Excel compatibility in CSV files.
pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";

/// Rows buffered by the Parquet writer before a record batch is flushed.
pub const PARQUET_ROW_GROUP_ROWS: usize = 1000;
