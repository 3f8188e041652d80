//! Error types for camtrap.

/// Result type alias for camtrap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for camtrap.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid run parameters (batch size, confidence threshold, ...).
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid setting.
        message: String,
    },

    /// A top-level path is missing or cannot be read or created.
    #[error("cannot access '{path}'")]
    Access {
        /// The offending path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to open the manifest file.
    #[error("failed to read manifest '{path}'")]
    ManifestRead {
        /// Path to the manifest.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A manifest record could not be parsed.
    #[error("invalid manifest record in '{path}' at line {line}")]
    ManifestParse {
        /// Path to the manifest.
        path: std::path::PathBuf,
        /// One-based line number of the bad record.
        line: u64,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A required manifest column is absent from the header.
    #[error("manifest '{path}' is missing required column '{column}'")]
    ManifestColumn {
        /// Path to the manifest.
        path: std::path::PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },

    /// Failed to read a file reference list.
    #[error("failed to read file list '{path}'")]
    FileListRead {
        /// Path to the list file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Image could not be opened or decoded.
    #[error("failed to load image '{path}'")]
    ImageDecode {
        /// Path to the image.
        path: std::path::PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Detector failed while processing a batch.
    #[error("detector failed: {reason}")]
    Detector {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to read a recorded detections file.
    #[error("failed to read detections file '{path}'")]
    DetectionsRead {
        /// Path to the detections file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a recorded detections file.
    #[error("failed to parse detections file '{path}'")]
    DetectionsParse {
        /// Path to the detections file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to create a symbolic link.
    #[error("failed to link '{link}' -> '{target}'")]
    SymlinkCreate {
        /// Link location in the destination directory.
        link: std::path::PathBuf,
        /// Target the link should point to.
        target: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Another sync holds the destination directory.
    #[error("destination is locked by {holder}: {path}")]
    DestinationLocked {
        /// Path to the lock file.
        path: std::path::PathBuf,
        /// Who holds the lock, as recorded in the lock file.
        holder: String,
    },

    /// Failed to create lock file.
    #[error("failed to create lock file '{path}'")]
    LockCreate {
        /// Path to the lock file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a stale lock file.
    #[error("failed to remove lock file '{path}'")]
    LockRemove {
        /// Path to the lock file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write CSV output.
    #[error("failed to write CSV output '{path}'")]
    CsvWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write Parquet output.
    #[error("parquet output failed: {context}")]
    ParquetWrite {
        /// What was being attempted.
        context: String,
        /// Underlying parquet error.
        #[source]
        source: parquet::errors::ParquetError,
    },

    /// Failed to assemble an Arrow record batch.
    #[error("failed to build record batch")]
    ArrowBuild {
        /// Underlying arrow error.
        #[source]
        source: arrow::error::ArrowError,
    },
}
