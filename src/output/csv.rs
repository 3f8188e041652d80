//! CSV output format writer.

use crate::constants::{COORD_DECIMAL_PLACES, UTF8_BOM, confidence::DECIMAL_PLACES};
use crate::error::{Error, Result};
use crate::output::{DetectionRow, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column names, in output order.
pub const CSV_HEADER: [&str; 8] = [
    "x_center",
    "y_center",
    "width",
    "height",
    "confidence",
    "class",
    "name",
    "file_name",
];

/// CSV format output writer.
pub struct CsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
}

impl CsvWriter {
    /// Create a new CSV writer.
    ///
    /// With `bom` set, a UTF-8 byte order mark is written first so
    /// spreadsheet tools detect the encoding of non-ASCII file names.
    pub fn new(path: &Path, bom: bool) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        if bom {
            file.write_all(UTF8_BOM)?;
        }
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.to_path_buf(),
        })
    }

    fn csv_error(&self, source: csv::Error) -> Error {
        Error::CsvWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(CSV_HEADER)
            .map_err(|e| self.csv_error(e))
    }

    fn write_detection(&mut self, detection: &DetectionRow) -> Result<()> {
        let record = [
            format!("{:.coord$}", detection.x_center, coord = COORD_DECIMAL_PLACES),
            format!("{:.coord$}", detection.y_center, coord = COORD_DECIMAL_PLACES),
            format!("{:.coord$}", detection.width, coord = COORD_DECIMAL_PLACES),
            format!("{:.coord$}", detection.height, coord = COORD_DECIMAL_PLACES),
            format!("{:.decimal$}", detection.confidence, decimal = DECIMAL_PLACES),
            detection.class.to_string(),
            detection.name.clone(),
            detection.file_name.clone(),
        ];
        self.writer
            .write_record(&record)
            .map_err(|e| self.csv_error(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
