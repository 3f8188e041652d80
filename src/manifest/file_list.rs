//! File reference list reading.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Read a list of file paths, one per line.
///
/// # File Format
/// - One path per line, absolute or relative to the current directory
/// - Leading and trailing whitespace is trimmed
/// - Blank lines and lines starting with `#` are ignored
///
/// The same format is produced by `camtrap scan -o`.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(path).map_err(|e| Error::FileListRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut files = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| Error::FileListRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            files.push(PathBuf::from(trimmed));
        }
    }

    Ok(files)
}
