// Mirror Engine
// One-way directory synchronization: makes a target directory match a source

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use filetime::FileTime;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::utilities::{is_inside, normalize_path, PatternMatcher};

/// Action requested from the mirror engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Copy new and changed files from source to target
    Sync,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Sync => "sync",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a mirror run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Delete target entries that have no counterpart in the source
    pub purge: bool,
    /// Create the target directory when it does not exist
    pub create: bool,
    /// Patterns skipped on both sides
    pub excludes: Vec<String>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            purge: true,
            create: true,
            excludes: Vec::new(),
        }
    }
}

/// One sync job request. Immutable once handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub source: PathBuf,
    pub target: PathBuf,
    pub action: SyncAction,
    pub options: MirrorOptions,
}

impl SyncRequest {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, options: MirrorOptions) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            action: SyncAction::Sync,
            options,
        }
    }
}

/// Counters collected during a mirror run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub dirs_parsed: usize,
    pub dirs_created: usize,
    pub files_copied: usize,
    pub files_updated: usize,
    pub files_unchanged: usize,
    pub files_purged: usize,
    pub dirs_purged: usize,
    pub elapsed: Duration,
}

impl MirrorReport {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} copied, {} updated, {} purged, {} dirs created",
            self.files_copied,
            self.files_updated,
            self.files_purged + self.dirs_purged,
            self.dirs_created
        )
    }
}

/// Errors raised by a mirror run
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("target directory does not exist and create is disabled: {0}")]
    TargetMissing(PathBuf),

    #[error("target is not a directory: {0}")]
    TargetNotDirectory(PathBuf),

    #[error("source and target are the same directory: {0}")]
    SameDirectory(PathBuf),

    #[error("target {target_dir} is inside source {source_dir}")]
    TargetInsideSource { source_dir: PathBuf, target_dir: PathBuf },

    #[error("source {source_dir} is inside target {target_dir}")]
    SourceInsideTarget { source_dir: PathBuf, target_dir: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> MirrorError + '_ {
    move |source| MirrorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A directory mirror implementation
///
/// Called from background workers, so implementations must be shareable
/// across threads. A call may take arbitrarily long and may fail.
pub trait Mirror: Send + Sync {
    fn mirror(&self, request: &SyncRequest) -> Result<MirrorReport, MirrorError>;
}

/// Default filesystem mirror engine
#[derive(Debug, Clone, Default)]
pub struct MirrorEngine;

impl Mirror for MirrorEngine {
    fn mirror(&self, request: &SyncRequest) -> Result<MirrorReport, MirrorError> {
        match request.action {
            SyncAction::Sync => self.sync(&request.source, &request.target, &request.options),
        }
    }
}

impl MirrorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Make `target` match `source`
    pub fn sync(&self, source: &Path, target: &Path, options: &MirrorOptions) -> Result<MirrorReport, MirrorError> {
        let started = Instant::now();
        let source = absolute(source)?;
        let target = absolute(target)?;

        info!(source = %source.display(), target = %target.display(), purge = options.purge, create = options.create, "mirror started");

        let mut report = MirrorReport::default();
        Self::check_roots(&source, &target)?;
        Self::prepare_target(&target, options.create, &mut report)?;

        let matcher = PatternMatcher::new(&options.excludes)?;
        Self::copy_tree(&source, &target, &matcher, &mut report)?;

        if options.purge {
            Self::purge_tree(&source, &target, &matcher, &mut report)?;
        }

        report.elapsed = started.elapsed();
        info!(
            source = %source.display(),
            target = %target.display(),
            dirs_parsed = report.dirs_parsed,
            files_copied = report.files_copied,
            files_updated = report.files_updated,
            files_purged = report.files_purged,
            dirs_created = report.dirs_created,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "mirror finished"
        );

        Ok(report)
    }

    fn check_roots(source: &Path, target: &Path) -> Result<(), MirrorError> {
        if source == target {
            return Err(MirrorError::SameDirectory(source.to_path_buf()));
        }
        if is_inside(target, source) {
            return Err(MirrorError::TargetInsideSource {
                source_dir: source.to_path_buf(),
                target_dir: target.to_path_buf(),
            });
        }
        if is_inside(source, target) {
            return Err(MirrorError::SourceInsideTarget {
                source_dir: source.to_path_buf(),
                target_dir: target.to_path_buf(),
            });
        }

        match fs::metadata(source) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(MirrorError::SourceNotDirectory(source.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(MirrorError::SourceMissing(source.to_path_buf()))
            }
            Err(e) => Err(io_error(source)(e)),
        }
    }

    fn prepare_target(target: &Path, create: bool, report: &mut MirrorReport) -> Result<(), MirrorError> {
        match fs::metadata(target) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(MirrorError::TargetNotDirectory(target.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if !create {
                    return Err(MirrorError::TargetMissing(target.to_path_buf()));
                }
                fs::create_dir_all(target).map_err(io_error(target))?;
                report.dirs_created += 1;
                debug!(target = %target.display(), "created target directory");
                Ok(())
            }
            Err(e) => Err(io_error(target)(e)),
        }
    }

    fn copy_tree(
        source: &Path,
        target: &Path,
        matcher: &PatternMatcher,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        report.dirs_parsed += 1;

        let walker = WalkDir::new(source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.path()
                    .strip_prefix(source)
                    .map(|rel| !matcher.should_exclude(rel))
                    .unwrap_or(true)
            });

        for entry in walker {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| io_error(entry.path())(io::Error::new(io::ErrorKind::Other, "entry outside source")))?;
            let dest = target.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                report.dirs_parsed += 1;
                Self::ensure_dir(&dest, report)?;
            } else if file_type.is_file() {
                Self::sync_file(entry.path(), &dest, report)?;
            } else {
                debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
        }

        Ok(())
    }

    fn ensure_dir(dest: &Path, report: &mut MirrorReport) -> Result<(), MirrorError> {
        match fs::symlink_metadata(dest) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => {
                // A file sits where the directory belongs
                fs::remove_file(dest).map_err(io_error(dest))?;
                report.files_purged += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(dest)(e)),
        }

        fs::create_dir(dest).map_err(io_error(dest))?;
        report.dirs_created += 1;
        debug!(dir = %dest.display(), "created directory");
        Ok(())
    }

    fn sync_file(src: &Path, dest: &Path, report: &mut MirrorReport) -> Result<(), MirrorError> {
        let src_meta = fs::metadata(src).map_err(io_error(src))?;

        match fs::symlink_metadata(dest) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Self::copy_file(src, dest, &src_meta)?;
                report.files_copied += 1;
                debug!(file = %dest.display(), "copied");
            }
            Err(e) => return Err(io_error(dest)(e)),
            Ok(dest_meta) if dest_meta.file_type().is_symlink() => {
                // Never write through a link; the copy lands in its place
                fs::remove_file(dest).map_err(io_error(dest))?;
                Self::copy_file(src, dest, &src_meta)?;
                report.files_updated += 1;
                debug!(file = %dest.display(), "replaced symlink with file");
            }
            Ok(dest_meta) if dest_meta.is_dir() => {
                fs::remove_dir_all(dest).map_err(io_error(dest))?;
                Self::copy_file(src, dest, &src_meta)?;
                report.files_updated += 1;
                debug!(file = %dest.display(), "replaced directory with file");
            }
            Ok(dest_meta) => {
                if Self::needs_update(&src_meta, &dest_meta) {
                    Self::copy_file(src, dest, &src_meta)?;
                    report.files_updated += 1;
                    debug!(file = %dest.display(), "updated");
                } else {
                    report.files_unchanged += 1;
                }
            }
        }

        Ok(())
    }

    /// Sizes differ, or the source was modified after the target
    fn needs_update(src_meta: &fs::Metadata, dest_meta: &fs::Metadata) -> bool {
        if src_meta.len() != dest_meta.len() {
            return true;
        }
        FileTime::from_last_modification_time(src_meta) > FileTime::from_last_modification_time(dest_meta)
    }

    fn copy_file(src: &Path, dest: &Path, src_meta: &fs::Metadata) -> Result<(), MirrorError> {
        fs::copy(src, dest).map_err(io_error(dest))?;
        filetime::set_file_mtime(dest, FileTime::from_last_modification_time(src_meta))
            .map_err(io_error(dest))?;
        Ok(())
    }

    fn purge_tree(
        source: &Path,
        target: &Path,
        matcher: &PatternMatcher,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        let walker = WalkDir::new(target)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_entry(|e| {
                e.path()
                    .strip_prefix(target)
                    .map(|rel| !matcher.should_exclude(rel))
                    .unwrap_or(true)
            });

        for entry in walker {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(target) else {
                continue;
            };

            if fs::symlink_metadata(source.join(relative)).is_ok() {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                // Excluded entries survive the purge and keep their parent alive
                let empty = fs::read_dir(path).map_err(io_error(path))?.next().is_none();
                if empty {
                    fs::remove_dir(path).map_err(io_error(path))?;
                    report.dirs_purged += 1;
                    debug!(dir = %path.display(), "purged directory");
                } else {
                    debug!(dir = %path.display(), "kept non-empty directory holding excluded entries");
                }
            } else {
                fs::remove_file(path).map_err(io_error(path))?;
                report.files_purged += 1;
                debug!(file = %path.display(), "purged");
            }
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, MirrorError> {
    let absolute = std::path::absolute(path).map_err(io_error(path))?;
    Ok(normalize_path(&absolute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(purge: bool, create: bool) -> MirrorOptions {
        MirrorOptions {
            purge,
            create,
            excludes: Vec::new(),
        }
    }

    #[test]
    fn test_creates_missing_target_and_copies() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("x.txt"), b"hello").unwrap();

        let report = MirrorEngine::new()
            .sync(&source, &target, &options(true, true))
            .unwrap();

        assert!(target.is_dir());
        assert_eq!(fs::read(target.join("x.txt")).unwrap(), b"hello");
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.dirs_created, 1);
    }

    #[test]
    fn test_missing_target_without_create_fails() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        fs::create_dir(&source).unwrap();

        let err = MirrorEngine::new()
            .sync(&source, &tmp.path().join("b"), &options(true, false))
            .unwrap_err();
        assert!(matches!(err, MirrorError::TargetMissing(_)));
    }

    #[test]
    fn test_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = MirrorEngine::new()
            .sync(&tmp.path().join("nope"), &tmp.path().join("b"), &options(true, true))
            .unwrap_err();
        assert!(matches!(err, MirrorError::SourceMissing(_)));
        assert!(!tmp.path().join("b").exists());
    }

    #[test]
    fn test_nested_roots_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        fs::create_dir(&source).unwrap();

        let engine = MirrorEngine::new();
        assert!(matches!(
            engine.sync(&source, &source, &options(true, true)),
            Err(MirrorError::SameDirectory(_))
        ));
        assert!(matches!(
            engine.sync(&source, &source.join("inner"), &options(true, true)),
            Err(MirrorError::TargetInsideSource { .. })
        ));
        assert!(matches!(
            engine.sync(&source, tmp.path(), &options(true, true)),
            Err(MirrorError::SourceInsideTarget { .. })
        ));
    }

    #[test]
    fn test_nested_directories_and_updates() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir_all(source.join("sub/deep")).unwrap();
        fs::write(source.join("sub/deep/file.bin"), b"v1").unwrap();

        let engine = MirrorEngine::new();
        engine.sync(&source, &target, &options(true, true)).unwrap();
        assert_eq!(fs::read(target.join("sub/deep/file.bin")).unwrap(), b"v1");

        // Same mtime, different size
        fs::write(source.join("sub/deep/file.bin"), b"version two").unwrap();
        let report = engine.sync(&source, &target, &options(true, true)).unwrap();
        assert_eq!(report.files_updated, 1);
        assert_eq!(fs::read(target.join("sub/deep/file.bin")).unwrap(), b"version two");

        let report = engine.sync(&source, &target, &options(true, true)).unwrap();
        assert_eq!(report.files_unchanged, 1);
        assert_eq!(report.files_copied + report.files_updated, 0);
    }

    #[test]
    fn test_purge_removes_extraneous_entries() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir(&source).unwrap();
        fs::create_dir_all(target.join("stale/dir")).unwrap();
        fs::write(source.join("keep.txt"), b"k").unwrap();
        fs::write(target.join("extra.txt"), b"e").unwrap();
        fs::write(target.join("stale/dir/old.txt"), b"o").unwrap();

        let report = MirrorEngine::new()
            .sync(&source, &target, &options(true, true))
            .unwrap();

        assert!(target.join("keep.txt").exists());
        assert!(!target.join("extra.txt").exists());
        assert!(!target.join("stale").exists());
        assert_eq!(report.files_purged, 2);
        assert_eq!(report.dirs_purged, 2);
    }

    #[test]
    fn test_without_purge_extraneous_entries_stay() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(target.join("extra.txt"), b"e").unwrap();

        MirrorEngine::new()
            .sync(&source, &target, &options(false, true))
            .unwrap();
        assert!(target.join("extra.txt").exists());
    }

    #[test]
    fn test_excludes_apply_to_copy_and_purge() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir_all(source.join("cache")).unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(source.join("cache/blob"), b"c").unwrap();
        fs::write(source.join("main.rs"), b"m").unwrap();
        fs::write(source.join("scratch.tmp"), b"s").unwrap();
        fs::write(target.join("local.tmp"), b"l").unwrap();

        let opts = MirrorOptions {
            purge: true,
            create: true,
            excludes: vec!["cache".to_string(), "*.tmp".to_string()],
        };
        MirrorEngine::new().sync(&source, &target, &opts).unwrap();

        assert!(target.join("main.rs").exists());
        assert!(!target.join("cache").exists());
        assert!(!target.join("scratch.tmp").exists());
        assert!(target.join("local.tmp").exists());
    }

    #[test]
    fn test_purge_keeps_directory_holding_excluded_entries() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir(&source).unwrap();
        fs::create_dir_all(target.join("stale")).unwrap();
        fs::write(target.join("stale/notes.tmp"), b"n").unwrap();
        fs::write(target.join("stale/old.txt"), b"o").unwrap();

        let opts = MirrorOptions {
            purge: true,
            create: true,
            excludes: vec!["*.tmp".to_string()],
        };
        let report = MirrorEngine::new().sync(&source, &target, &opts).unwrap();

        assert!(target.join("stale").is_dir());
        assert!(target.join("stale/notes.tmp").exists());
        assert!(!target.join("stale/old.txt").exists());
        assert_eq!(report.files_purged, 1);
        assert_eq!(report.dirs_purged, 0);
    }

    #[test]
    fn test_invalid_exclude_pattern_fails() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        fs::create_dir(&source).unwrap();

        let opts = MirrorOptions {
            purge: true,
            create: true,
            excludes: vec!["[unclosed".to_string()],
        };
        let err = MirrorEngine::new()
            .sync(&source, &tmp.path().join("b"), &opts)
            .unwrap_err();
        assert!(matches!(err, MirrorError::Pattern(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_target_symlink_is_replaced_not_followed() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        let outside = tmp.path().join("outside.txt");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(source.join("x.txt"), b"new contents").unwrap();
        fs::write(&outside, b"victim").unwrap();
        symlink(&outside, target.join("x.txt")).unwrap();

        let report = MirrorEngine::new()
            .sync(&source, &target, &options(true, true))
            .unwrap();

        assert_eq!(fs::read(&outside).unwrap(), b"victim");
        let meta = fs::symlink_metadata(target.join("x.txt")).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read(target.join("x.txt")).unwrap(), b"new contents");
        assert_eq!(report.files_updated, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_target_symlink_creates_nothing_outside() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        let outside = tmp.path().join("created_outside.txt");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(source.join("y.txt"), b"y").unwrap();
        symlink(&outside, target.join("y.txt")).unwrap();

        MirrorEngine::new()
            .sync(&source, &target, &options(true, true))
            .unwrap();

        assert!(!outside.exists());
        let meta = fs::symlink_metadata(target.join("y.txt")).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read(target.join("y.txt")).unwrap(), b"y");
    }

    #[test]
    fn test_file_replaced_by_directory() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        let target = tmp.path().join("b");
        fs::create_dir_all(source.join("thing")).unwrap();
        fs::write(source.join("thing/inner.txt"), b"i").unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(target.join("thing"), b"was a file").unwrap();

        MirrorEngine::new()
            .sync(&source, &target, &options(true, true))
            .unwrap();
        assert!(target.join("thing").is_dir());
        assert!(target.join("thing/inner.txt").is_file());
    }

    #[test]
    fn test_mirror_trait_dispatches_sync() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("x.txt"), b"x").unwrap();

        let request = SyncRequest::new(&source, tmp.path().join("b"), MirrorOptions::default());
        assert_eq!(request.action.to_string(), "sync");

        let engine: &dyn Mirror = &MirrorEngine::new();
        let report = engine.mirror(&request).unwrap();
        assert_eq!(report.files_copied, 1);
    }
}
