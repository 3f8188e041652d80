//! Symlink curation of selected images into a flat directory.
//!
//! A curated set is a directory of symbolic links named after their source
//! files. Syncing is repeatable: every entry is removed and recreated, so a
//! destination can be refreshed from an updated file list without cleanup.

mod lock;

pub use lock::{LockInfo, release_held_locks};

use crate::error::{Error, Result};
use lock::{SyncLock, lock_path};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings for [`sync_symlinks_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Break an existing lock older than this instead of refusing to sync.
    pub stale_lock_after: Option<Duration>,
}

/// Outcome of a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Links created (existing entries were replaced, not skipped).
    pub created: usize,
    /// Of `created`, how many replaced an entry already in the destination.
    pub replaced: usize,
    /// Sources that did not exist, in input order.
    pub missing: Vec<PathBuf>,
    /// Holder of a stale lock that was broken to run this sync.
    pub broken_lock: Option<LockInfo>,
}

/// Mirror `files` into `destination` as symbolic links.
///
/// Each link is named after its source's base name and points at the
/// absolute source path. Existing entries with that name are replaced.
/// Missing sources are skipped and reported. When two sources share a base
/// name the later one wins.
///
/// # Errors
///
/// Returns [`Error::Access`] if `destination` cannot be created,
/// [`Error::DestinationLocked`] if another sync holds it, and
/// [`Error::SymlinkCreate`] if an entry cannot be replaced.
pub fn sync_symlinks<P: AsRef<Path>>(files: &[P], destination: &Path) -> Result<SyncReport> {
    sync_symlinks_with(files, destination, &SyncOptions::default())
}

/// [`sync_symlinks`] with explicit options.
pub fn sync_symlinks_with<P: AsRef<Path>>(
    files: &[P],
    destination: &Path,
    options: &SyncOptions,
) -> Result<SyncReport> {
    fs::create_dir_all(destination).map_err(|e| Error::Access {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let (_lock, broken_lock) =
        SyncLock::acquire(destination, files.len(), options.stale_lock_after)?;
    if let Some(holder) = &broken_lock {
        warn!("Broke stale lock in {} held by {holder}", destination.display());
    }

    let mut report = SyncReport {
        broken_lock,
        ..SyncReport::default()
    };
    for file in files {
        let file = file.as_ref();
        let source = std::path::absolute(file)?;

        if fs::metadata(&source).is_err() {
            debug!("Skipping missing source: {}", source.display());
            report.missing.push(source);
            continue;
        }

        let Some(name) = source.file_name() else {
            warn!("Skipping source without a file name: {}", source.display());
            continue;
        };
        let link = destination.join(name);

        if link == source {
            warn!("Skipping {}: source is inside the destination", source.display());
            continue;
        }

        if remove_existing(&link, &source)? {
            report.replaced += 1;
        }
        create_link(&source, &link)?;
        report.created += 1;
    }

    info!(
        "Linked {} file(s) into {} ({} replaced, {} missing)",
        report.created,
        destination.display(),
        report.replaced,
        report.missing.len()
    );

    Ok(report)
}

/// Remove whatever occupies `link`, including a dangling symlink.
///
/// Returns whether anything was there. Real directories are never removed.
fn remove_existing(link: &Path, target: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(link) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(symlink_error(link, target, e)),
    };

    if meta.is_dir() {
        return Err(symlink_error(
            link,
            target,
            io::Error::new(io::ErrorKind::IsADirectory, "a directory occupies the link name"),
        ));
    }

    debug!("Replacing existing entry: {}", link.display());
    fs::remove_file(link).map_err(|e| symlink_error(link, target, e))?;
    Ok(true)
}

#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| symlink_error(link, target, e))
}

#[cfg(windows)]
fn create_link(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link).map_err(|e| symlink_error(link, target, e))
}

fn symlink_error(link: &Path, target: &Path, source: io::Error) -> Error {
    Error::SymlinkCreate {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    }
}
