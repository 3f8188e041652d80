//! Output writer trait definition.

use crate::error::Result;
use crate::output::DetectionRow;

/// Trait for writing detection tables.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single detection row.
    fn write_detection(&mut self, detection: &DetectionRow) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
