//! Output format writers.

mod csv;
mod json;
mod parquet;
pub mod progress;
mod types;
mod writer;

pub use csv::{CSV_HEADER, CsvWriter};
pub use json::{JsonResultFile, JsonResultWriter, JsonSummary};
pub use parquet::{ParquetWriter, detection_schema};
pub use types::{AggregateResult, BatchResult, DetectionRow, RunMetadata};
pub use writer::OutputWriter;
