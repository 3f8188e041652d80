//! Labeled image manifests and file reference lists.
//!
//! A manifest is an ordered table with one row per labeled image. It is read
//! from CSV with at least the columns `image_path_rel`, `class` and `type`;
//! any further columns are ignored.

mod file_list;

pub use file_list::read_file_list;

use crate::constants::manifest_columns;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Numeric class code assigned by the manifest.
pub type ClassCode = u32;

/// One labeled image to run detection on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    /// Image path relative to the image root.
    pub image_path_rel: String,
    /// Authoritative class code for every box found in this image.
    pub class: ClassCode,
    /// Authoritative class name (e.g. "lion").
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ManifestRow {
    /// Convenience constructor.
    pub fn new(
        image_path_rel: impl Into<String>,
        class: ClassCode,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            image_path_rel: image_path_rel.into(),
            class,
            type_name: type_name.into(),
        }
    }
}

/// Read a manifest from a CSV file.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let rows = parse_manifest(reader, path)?;
    debug!("Read {} manifest rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse manifest records from any CSV reader.
///
/// `origin` is only used for error messages.
pub fn parse_manifest<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
) -> Result<Vec<ManifestRow>> {
    let headers = reader.headers().map_err(|e| Error::ManifestRead {
        path: origin.to_path_buf(),
        source: e,
    })?;
    for column in [
        manifest_columns::IMAGE_PATH,
        manifest_columns::CLASS,
        manifest_columns::TYPE,
    ] {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::ManifestColumn {
                path: origin.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();

    for record in reader.deserialize::<ManifestRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                return Err(Error::ManifestParse {
                    path: origin.to_path_buf(),
                    line,
                    source: e,
                });
            }
        }
    }

    Ok(rows)
}
