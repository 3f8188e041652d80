//! Parquet output format writer.
//!
//! Columnar output for loading detection tables straight into data-science
//! tooling (pandas, polars, DuckDB) without CSV type guessing.

use arrow::array::{ArrayRef, Float32Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::constants::PARQUET_ROW_GROUP_ROWS;
use crate::error::{Error, Result};
use crate::output::{DetectionRow, OutputWriter};

/// Parquet writer for detection tables.
///
/// Buffers rows and writes them as record batches.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
    rows: Vec<DetectionRow>,
    batch_size: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer.
    ///
    /// # Errors
    ///
    /// Returns error if file creation fails or the Parquet writer cannot be
    /// initialized.
    pub fn new(output_path: &Path) -> Result<Self> {
        let schema = detection_schema();
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_writer_version(parquet::file::properties::WriterVersion::PARQUET_2_0)
            .build();

        let file = File::create(output_path)?;

        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(|e| {
            Error::ParquetWrite {
                context: "failed to initialize Parquet writer".to_string(),
                source: e,
            }
        })?;

        Ok(Self {
            writer: Some(writer),
            schema,
            rows: Vec::new(),
            batch_size: PARQUET_ROW_GROUP_ROWS,
        })
    }

    /// Flush buffered rows to the file.
    fn flush_batch(&mut self) -> Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }

        let batch = build_record_batch(&self.rows, &self.schema)?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write(&batch).map_err(|e| Error::ParquetWrite {
                context: "failed to write record batch".to_string(),
                source: e,
            })?;
        }
        self.rows.clear();

        Ok(())
    }
}

impl OutputWriter for ParquetWriter {
    fn write_header(&mut self) -> Result<()> {
        // Schema is embedded in the file footer.
        Ok(())
    }

    fn write_detection(&mut self, detection: &DetectionRow) -> Result<()> {
        self.rows.push(detection.clone());
        if self.rows.len() >= self.batch_size {
            self.flush_batch()?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.flush_batch()?;
        if let Some(writer) = self.writer.take() {
            writer.close().map_err(|e| Error::ParquetWrite {
                context: "failed to close Parquet writer".to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Arrow schema of the detection table.
pub fn detection_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("x_center", DataType::Float32, false),
        Field::new("y_center", DataType::Float32, false),
        Field::new("width", DataType::Float32, false),
        Field::new("height", DataType::Float32, false),
        Field::new("confidence", DataType::Float32, false),
        Field::new("class", DataType::UInt32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("file_name", DataType::Utf8, false),
    ]))
}

/// Build an Arrow record batch from detection rows.
fn build_record_batch(rows: &[DetectionRow], schema: &Arc<Schema>) -> Result<RecordBatch> {
    let x_center: Float32Array = rows.iter().map(|r| Some(r.x_center)).collect();
    let y_center: Float32Array = rows.iter().map(|r| Some(r.y_center)).collect();
    let width: Float32Array = rows.iter().map(|r| Some(r.width)).collect();
    let height: Float32Array = rows.iter().map(|r| Some(r.height)).collect();
    let confidence: Float32Array = rows.iter().map(|r| Some(r.confidence)).collect();
    let class: UInt32Array = rows.iter().map(|r| Some(r.class)).collect();
    let name: StringArray = rows.iter().map(|r| Some(r.name.as_str())).collect();
    let file_name: StringArray = rows.iter().map(|r| Some(r.file_name.as_str())).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(x_center),
        Arc::new(y_center),
        Arc::new(width),
        Arc::new(height),
        Arc::new(confidence),
        Arc::new(class),
        Arc::new(name),
        Arc::new(file_name),
    ];

    RecordBatch::try_new(schema.clone(), columns).map_err(|e| Error::ArrowBuild { source: e })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::RawDetection;
    use crate::manifest::ManifestRow;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn rows(n: usize) -> Vec<DetectionRow> {
        let raw = RawDetection {
            x_center: 0.5,
            y_center: 0.5,
            width: 0.1,
            height: 0.1,
            confidence: 0.9,
            class: 1,
        };
        (0..n)
            .map(|i| DetectionRow::labeled(&raw, &ManifestRow::new(format!("{i}.jpg"), 7, "lion")))
            .collect()
    }

    #[test]
    fn test_parquet_writer_row_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detections.parquet");

        let mut writer = ParquetWriter::new(&path).unwrap();
        writer.write_header().unwrap();
        for row in rows(PARQUET_ROW_GROUP_ROWS + 5) {
            writer.write_detection(&row).unwrap();
        }
        writer.finalize().unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let total: i64 = reader.metadata().file_metadata().num_rows();
        assert_eq!(total, i64::try_from(PARQUET_ROW_GROUP_ROWS + 5).unwrap());
        assert_eq!(reader.metadata().file_metadata().schema_descr().num_columns(), 8);
    }

    #[test]
    fn test_record_batch_schema() {
        let batch = build_record_batch(&rows(3), &detection_schema()).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.schema().field(5).name(), "class");
    }
}
