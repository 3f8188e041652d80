//! Recursive directory scanning.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Files found under a root, plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Absolute paths of every file found, symbolic links to files included.
    pub files: Vec<PathBuf>,
    /// Entries skipped because they could not be read.
    pub skipped: Vec<SkippedEntry>,
}

/// An entry the walk had to skip.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    /// Path of the entry, when the walker knows it.
    pub path: Option<PathBuf>,
    /// Human-readable reason.
    pub reason: String,
}

/// Recursively list every file under `root`.
///
/// Paths are returned in file-system iteration order and are absolute
/// (relative roots are resolved against the current directory; symlinks in
/// the root are not resolved). Symbolic links inside the tree are listed
/// like files unless they point at a directory; linked directories are
/// neither listed nor descended into. Unreadable subdirectories are logged
/// and skipped; only an unreadable root fails the scan.
pub fn scan_files(root: &Path) -> Result<ScanReport> {
    let root = std::path::absolute(root).map_err(|e| Error::Access {
        path: root.to_path_buf(),
        source: e,
    })?;

    let metadata = std::fs::metadata(&root).map_err(|e| Error::Access {
        path: root.clone(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(Error::Access {
            path: root,
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    // An unreadable root is fatal.
    std::fs::read_dir(&root).map_err(|e| Error::Access {
        path: root.clone(),
        source: e,
    })?;

    let mut report = ScanReport::default();

    for entry in WalkDir::new(&root).follow_links(false) {
        match entry {
            Ok(entry) if lists_as_file(&entry) => report.files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                let path = err.path().map(Path::to_path_buf);
                warn!(
                    "Skipping unreadable entry {}: {}",
                    path.as_deref().map_or_else(|| "<unknown>".into(), |p| p.display().to_string()),
                    err
                );
                report.skipped.push(SkippedEntry {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        "Scanned {}: {} files, {} skipped",
        root.display(),
        report.files.len(),
        report.skipped.len()
    );

    Ok(report)
}

/// Whether a walk entry is reported as a file.
///
/// Dangling links count as files.
fn lists_as_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return !std::fs::metadata(entry.path()).is_ok_and(|m| m.is_dir());
    }
    !file_type.is_dir()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("top.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a/one.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a/b/c/deep.JPG"), b"x").unwrap();

        let report = scan_files(dir.path()).unwrap();
        let found: HashSet<_> = report.files.iter().cloned().collect();

        assert_eq!(report.files.len(), 3);
        assert!(found.contains(&dir.path().join("top.jpg")));
        assert!(found.contains(&dir.path().join("a/b/c/deep.JPG")));
        assert!(report.files.iter().all(|p| p.is_absolute()));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_scan_excludes_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let report = scan_files(dir.path()).unwrap();
        assert!(report.files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_lists_file_links_but_not_directory_links() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("IMG_0007.JPG");
        fs::write(&target, b"x").unwrap();

        symlink(&target, dir.path().join("linked.jpg")).unwrap();
        symlink(outside.path().join("gone.jpg"), dir.path().join("dangling.jpg")).unwrap();
        symlink(outside.path(), dir.path().join("linked_dir")).unwrap();

        let report = scan_files(dir.path()).unwrap();
        let found: HashSet<_> = report.files.into_iter().collect();

        assert_eq!(
            found,
            HashSet::from([dir.path().join("linked.jpg"), dir.path().join("dangling.jpg")])
        );
    }

    #[test]
    fn test_scan_missing_root_is_access_error() {
        let result = scan_files(Path::new("/nonexistent/camera/traps"));
        assert!(matches!(result, Err(Error::Access { .. })));
    }

    #[test]
    fn test_scan_file_root_is_access_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir.jpg");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(scan_files(&file), Err(Error::Access { .. })));
    }
}
