//! Sync lock held in a destination directory.
//!
//! The lock file records who is syncing and how many sources they were
//! given. A second sync reads it back to explain the refusal, and a sync
//! configured with a stale timeout judges the lock by its recorded
//! acquisition time.

use crate::constants::SYNC_LOCK_FILE;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

/// Holder of a destination, as recorded in its lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID of the syncing process.
    pub pid: u32,
    /// Host the sync runs on.
    pub hostname: String,
    /// When the sync started.
    pub acquired: DateTime<Utc>,
    /// Number of sources the sync was given.
    pub sources: usize,
}

impl LockInfo {
    fn current(sources: usize) -> Self {
        Self {
            pid: std::process::id(),
            hostname: hostname::get().map_or_else(
                |_| "unknown".to_string(),
                |h| h.to_string_lossy().into_owned(),
            ),
            acquired: Utc::now(),
            sources,
        }
    }

    /// Time since the lock was taken. Clock skew counts as zero.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.acquired).to_std().unwrap_or_default()
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pid {} on {} since {} ({} sources)",
            self.pid,
            self.hostname,
            self.acquired.format("%Y-%m-%d %H:%M:%S UTC"),
            self.sources
        )
    }
}

/// Lock on a destination for the lifetime of one sync. Removed on drop.
#[derive(Debug)]
pub(crate) struct SyncLock {
    path: PathBuf,
}

impl SyncLock {
    /// Take the lock on `destination`, which must exist.
    ///
    /// With `stale_after`, an existing lock older than that is broken and
    /// its holder returned alongside the new lock.
    pub(crate) fn acquire(
        destination: &Path,
        sources: usize,
        stale_after: Option<Duration>,
    ) -> Result<(Self, Option<LockInfo>)> {
        let path = lock_path(destination);

        let broken = match stale_after {
            Some(max_age) => break_if_stale(&path, max_age)?,
            None => None,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let holder = read_holder(&path)
                    .map_or_else(|| "an unknown process".to_string(), |info| info.to_string());
                return Err(Error::DestinationLocked { path, holder });
            }
            Err(e) => return Err(Error::LockCreate { path, source: e }),
        };

        let info = LockInfo::current(sources);
        let json = serde_json::to_string_pretty(&info).unwrap_or_else(|_| "{}".to_string());
        // An unreadable holder record still locks; it is only reported as unknown.
        let _ = file.write_all(json.as_bytes());

        register(&path);
        Ok((Self { path }, broken))
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        unregister(&self.path);
    }
}

/// Path of the lock file inside `destination`.
pub(crate) fn lock_path(destination: &Path) -> PathBuf {
    destination.join(SYNC_LOCK_FILE)
}

fn read_holder(path: &Path) -> Option<LockInfo> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Remove the lock at `path` if it is older than `max_age`.
///
/// Age comes from the recorded acquisition time; a lock without a readable
/// record falls back to its modification time.
fn break_if_stale(path: &Path, max_age: Duration) -> Result<Option<LockInfo>> {
    let holder = read_holder(path);
    let age = match &holder {
        Some(info) => Some(info.age()),
        None => fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(|modified| modified.elapsed().unwrap_or_default()),
    };

    match age {
        Some(age) if age > max_age => {
            fs::remove_file(path).map_err(|e| Error::LockRemove {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(holder.unwrap_or_else(|| LockInfo {
                pid: 0,
                hostname: "unknown".to_string(),
                acquired: DateTime::<Utc>::UNIX_EPOCH,
                sources: 0,
            })))
        }
        _ => Ok(None),
    }
}

/// Locks held by this process, removed on interrupt.
static HELD_LOCKS: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

fn register(path: &Path) {
    if let Ok(mut held) = HELD_LOCKS.lock() {
        held.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut held) = HELD_LOCKS.lock() {
        held.retain(|p| p != path);
    }
}

/// Remove every sync lock this process holds. Called from the Ctrl+C handler.
pub fn release_held_locks() {
    if let Ok(held) = HELD_LOCKS.lock() {
        for path in held.iter() {
            let _ = fs::remove_file(path);
        }
    }
}
