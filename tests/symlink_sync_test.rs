//! Integration tests for symlink curation.

#![cfg(unix)]

use camtrap::curation::{SyncReport, sync_symlinks};
use camtrap::manifest::read_file_list;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::PathBuf;
use tempfile::TempDir;

fn make_sources(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    names
        .iter()
        .map(|name| {
            let path = src.join(name);
            fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_sync_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let sources = make_sources(&dir, &["a.jpg", "b.jpg"]);
    let dest = dir.path().join("curated");

    let first = sync_symlinks(&sources, &dest).unwrap();
    let second = sync_symlinks(&sources, &dest).unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(first.replaced, 0);
    assert_eq!(second.created, 2);
    assert_eq!(second.replaced, 2);
    for source in &sources {
        let link = dest.join(source.file_name().unwrap());
        assert_eq!(fs::read_link(&link).unwrap(), *source);
        assert_eq!(fs::read(&link).unwrap(), fs::read(source).unwrap());
    }
}

#[test]
fn test_stale_entries_are_replaced() {
    let dir = TempDir::new().unwrap();
    let sources = make_sources(&dir, &["a.jpg", "b.jpg", "c.jpg"]);
    let dest = dir.path().join("curated");
    fs::create_dir_all(&dest).unwrap();

    // Regular file, dangling link and a link to the wrong target.
    fs::write(dest.join("a.jpg"), b"stale copy").unwrap();
    symlink(dir.path().join("gone.jpg"), dest.join("b.jpg")).unwrap();
    symlink(&sources[0], dest.join("c.jpg")).unwrap();

    let report = sync_symlinks(&sources, &dest).unwrap();

    assert_eq!(report.created, 3);
    for source in &sources {
        let link = dest.join(source.file_name().unwrap());
        assert_eq!(fs::read_link(link).unwrap(), *source);
    }
}

#[test]
fn test_missing_sources_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut sources = make_sources(&dir, &["a.jpg"]);
    let missing = dir.path().join("src/missing.jpg");
    sources.push(missing.clone());
    let dest = dir.path().join("curated");

    let report = sync_symlinks(&sources, &dest).unwrap();

    assert_eq!(
        report,
        SyncReport {
            created: 1,
            missing: vec![missing],
            ..SyncReport::default()
        }
    );
    assert!(fs::symlink_metadata(dest.join("missing.jpg")).is_err());
}

#[test]
fn test_relative_sources_link_to_absolute_paths() {
    // Relative to the current directory, as paths in a hand-written list are.
    let dir = TempDir::new_in(".").unwrap();
    let sources = make_sources(&dir, &["a.jpg"]);
    assert!(sources[0].is_relative());
    let dest = dir.path().join("curated");

    sync_symlinks(&sources, &dest).unwrap();

    let target = fs::read_link(dest.join("a.jpg")).unwrap();
    assert!(target.is_absolute());
    assert_eq!(fs::read(dest.join("a.jpg")).unwrap(), b"a.jpg");
}

#[test]
fn test_sync_from_file_list() {
    let dir = TempDir::new().unwrap();
    let sources = make_sources(&dir, &["a.jpg", "b.jpg"]);
    let list = dir.path().join("selection.txt");
    fs::write(
        &list,
        format!(
            "{}\n\n# skipped\n{}\n",
            sources[0].display(),
            sources[1].display()
        ),
    )
    .unwrap();
    let dest = dir.path().join("curated");

    let files = read_file_list(&list).unwrap();
    let report = sync_symlinks(&files, &dest).unwrap();

    assert_eq!(report.created, 2);
    assert!(report.missing.is_empty());
}
