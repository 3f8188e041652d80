//! Output coordination for a finished run.

use crate::config::OutputFormat;
use crate::constants::output_filenames;
use crate::error::{Error, Result};
use crate::output::{
    AggregateResult, CsvWriter, JsonResultWriter, OutputWriter, ParquetWriter, RunMetadata,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Get output file path for a given format.
pub fn output_path_for(output_dir: &Path, format: OutputFormat) -> PathBuf {
    let name = match format {
        OutputFormat::Csv => output_filenames::CSV,
        OutputFormat::Json => output_filenames::JSON,
        OutputFormat::Parquet => output_filenames::PARQUET,
    };
    output_dir.join(name)
}

/// Create the output directory (and parents) if needed.
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })
}

/// Write the aggregate table in every requested format.
///
/// A run without detections writes nothing. Returns the paths written.
pub fn write_outputs(
    result: &AggregateResult,
    output_dir: &Path,
    formats: &[OutputFormat],
    metadata: &RunMetadata,
    csv_bom_enabled: bool,
) -> Result<Vec<PathBuf>> {
    if result.is_empty() {
        info!("No detections; no output written");
        return Ok(Vec::new());
    }

    prepare_output_dir(output_dir)?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let output_path = output_path_for(output_dir, *format);
        debug!("Writing {} output: {}", format, output_path.display());

        let mut writer: Box<dyn OutputWriter> = match format {
            OutputFormat::Csv => Box::new(CsvWriter::new(&output_path, csv_bom_enabled)?),
            OutputFormat::Json => Box::new(JsonResultWriter::new(&output_path, metadata.clone())),
            OutputFormat::Parquet => Box::new(ParquetWriter::new(&output_path)?),
        };

        writer.write_header()?;
        for detection in result.rows() {
            writer.write_detection(detection)?;
        }
        writer.finalize()?;

        info!("Wrote {} rows to {}", result.len(), output_path.display());
        written.push(output_path);
    }

    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::RawDetection;
    use crate::manifest::ManifestRow;
    use crate::output::DetectionRow;
    use tempfile::tempdir;

    fn result() -> AggregateResult {
        let raw = RawDetection::from_top_left([0.0, 0.0, 0.5, 0.5], 0.9, 1);
        AggregateResult::from_rows(vec![DetectionRow::labeled(
            &raw,
            &ManifestRow::new("a.jpg", 7, "lion"),
        )])
    }

    #[test]
    fn test_output_path_for_formats() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path_for(dir, OutputFormat::Csv),
            PathBuf::from("/out/detections.csv")
        );
        assert!(
            output_path_for(dir, OutputFormat::Parquet)
                .to_string_lossy()
                .ends_with(".parquet")
        );
    }

    #[test]
    fn test_write_outputs_all_formats() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/results");

        let written = write_outputs(
            &result(),
            &out,
            &[OutputFormat::Csv, OutputFormat::Json, OutputFormat::Parquet],
            &RunMetadata::default(),
            false,
        )
        .unwrap();

        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_no_detections_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results");

        let written = write_outputs(
            &AggregateResult::NoDetections,
            &out,
            &[OutputFormat::Csv],
            &RunMetadata::default(),
            false,
        )
        .unwrap();

        assert!(written.is_empty());
        assert!(!out.exists());
    }
}
