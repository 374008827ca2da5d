//! Conflict detection and file comparison.
//!
//! Two independent mechanisms live here:
//!
//! - [`check_conflicts`] is the cheap, metadata-only pre-transfer gate. It
//!   compares modification times and never reads content, so it can
//!   false-positive on touched-but-unchanged files and false-negative on
//!   content changed without an mtime bump. Pre-overwrite backups are the
//!   real safety net behind it.
//! - [`compare_files`] / [`compare_batch`] hash content and are the
//!   authoritative answer to "are these really different". They are used for
//!   read-only diff reporting and never block a transfer.

use crate::error::{Result, SyncError};
use crate::model::{
    format_bytes, format_timestamp, Comparison, ComparisonRecord, ComparisonStatus, CompareReport,
    ConflictKind, ConflictRecord, FileSnapshot,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Classify each file as safe, missing at source, or newer in the target.
///
/// A file absent at the target is not a conflict (plain new file), and
/// neither is a source at least as new as the target. Files whose metadata
/// cannot be read are skipped; the copy phase surfaces those as per-file
/// errors.
pub fn check_conflicts(
    files: &[String],
    source_path: &Path,
    target_path: &Path,
) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    for file in files {
        let source_file = source_path.join(file);
        let target_file = target_path.join(file);

        if !source_file.exists() {
            conflicts.push(ConflictRecord {
                file: file.clone(),
                kind: ConflictKind::MissingSource,
                message: "file does not exist in the source environment".to_string(),
                source_time: None,
                target_time: None,
            });
            continue;
        }

        if !target_file.exists() {
            continue;
        }

        let (Ok(source_time), Ok(target_time)) = (mtime(&source_file), mtime(&target_file)) else {
            continue;
        };

        if target_time > source_time {
            conflicts.push(ConflictRecord {
                file: file.clone(),
                kind: ConflictKind::NewerInTarget,
                message: "file in the target environment is more recent".to_string(),
                source_time: Some(format_timestamp(&source_time)),
                target_time: Some(format_timestamp(&target_time)),
            });
        }
    }

    conflicts
}

/// Content-hash comparison of a single file pair.
pub fn compare_files(file1: &Path, file2: &Path) -> Result<Comparison> {
    if !file1.exists() {
        return Ok(Comparison::status_only(
            ComparisonStatus::NotFoundSource,
            "source file does not exist",
        ));
    }

    if !file2.exists() {
        return Ok(Comparison::status_only(
            ComparisonStatus::NewFile,
            "file does not exist in the target (new)",
        ));
    }

    let hash1 = hash_file(file1)?;
    let hash2 = hash_file(file2)?;

    if hash1 == hash2 {
        return Ok(Comparison::status_only(
            ComparisonStatus::Identical,
            "files are identical",
        ));
    }

    let time1 = mtime(file1).map_err(SyncError::Io)?;
    let time2 = mtime(file2).map_err(SyncError::Io)?;
    let size1 = fs::metadata(file1).map_err(SyncError::Io)?.len();
    let size2 = fs::metadata(file2).map_err(SyncError::Io)?.len();

    Ok(Comparison {
        status: ComparisonStatus::Different,
        message: "files differ".to_string(),
        source: Some(snapshot(hash1, &time1, size1)),
        target: Some(snapshot(hash2, &time2, size2)),
        newer_in_source: Some(time1 > time2),
        size_diff: Some(size1 as i64 - size2 as i64),
    })
}

/// Compare a file list across two environment roots and tally the outcomes.
///
/// Pure and side-effect free; an empty list yields all-zero counts.
pub fn compare_batch(
    files: &[String],
    source_path: &Path,
    target_path: &Path,
    source_env: &str,
    target_env: &str,
) -> Result<CompareReport> {
    let mut report = CompareReport::default();

    for file in files {
        let comparison = compare_files(&source_path.join(file), &target_path.join(file))?;
        match comparison.status {
            ComparisonStatus::Identical => report.identical += 1,
            ComparisonStatus::Different => report.different += 1,
            ComparisonStatus::NewFile => report.new += 1,
            ComparisonStatus::NotFoundSource => report.not_found += 1,
        }
        report.files.push(ComparisonRecord {
            file: file.clone(),
            source_env: source_env.to_string(),
            target_env: target_env.to_string(),
            comparison,
        });
    }

    report.total = report.files.len();
    Ok(report)
}

fn hash_file(path: &Path) -> Result<String> {
    let content = fs::read(path).map_err(SyncError::Io)?;
    Ok(blake3::hash(&content).to_hex().to_string())
}

fn snapshot(hash: String, modified: &DateTime<Utc>, size: u64) -> FileSnapshot {
    FileSnapshot {
        hash,
        modified: format_timestamp(modified),
        size,
        size_formatted: format_bytes(size),
    }
}

pub(crate) fn mtime(path: &Path) -> std::io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn set_mtime(dir: &Path, name: &str, unix_secs: i64) {
        set_file_mtime(dir.join(name), FileTime::from_unix_time(unix_secs, 0)).unwrap();
    }

    #[test]
    fn missing_source_is_a_conflict() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        let conflicts =
            check_conflicts(&["ghost.txt".to_string()], source.path(), target.path());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::MissingSource);
        assert!(conflicts[0].source_time.is_none());
    }

    #[test]
    fn newer_target_is_a_conflict_with_both_timestamps() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write(source.path(), "a.txt", "old");
        write(target.path(), "a.txt", "edited");
        set_mtime(source.path(), "a.txt", 1_000_000);
        set_mtime(target.path(), "a.txt", 2_000_000);

        let conflicts = check_conflicts(&["a.txt".to_string()], source.path(), target.path());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::NewerInTarget);
        assert!(conflicts[0].source_time.is_some());
        assert!(conflicts[0].target_time.is_some());
    }

    #[test]
    fn new_file_and_older_target_are_not_conflicts() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write(source.path(), "new.txt", "fresh");
        write(source.path(), "b.txt", "newer here");
        write(target.path(), "b.txt", "older there");
        set_mtime(source.path(), "b.txt", 2_000_000);
        set_mtime(target.path(), "b.txt", 1_000_000);

        let files = vec!["new.txt".to_string(), "b.txt".to_string()];
        assert!(check_conflicts(&files, source.path(), target.path()).is_empty());
    }

    #[test]
    fn equal_mtime_is_not_a_conflict() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write(source.path(), "a.txt", "x");
        write(target.path(), "a.txt", "y");
        set_mtime(source.path(), "a.txt", 1_500_000);
        set_mtime(target.path(), "a.txt", 1_500_000);

        assert!(check_conflicts(&["a.txt".to_string()], source.path(), target.path()).is_empty());
    }

    #[test]
    fn compare_detects_identical_and_different() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.txt", "same bytes");
        write(dir.path(), "two.txt", "same bytes");
        write(dir.path(), "three.txt", "other bytes!");

        let same = compare_files(&dir.path().join("one.txt"), &dir.path().join("two.txt")).unwrap();
        assert_eq!(same.status, ComparisonStatus::Identical);
        assert!(same.source.is_none());

        let diff =
            compare_files(&dir.path().join("one.txt"), &dir.path().join("three.txt")).unwrap();
        assert_eq!(diff.status, ComparisonStatus::Different);
        let source = diff.source.unwrap();
        let target = diff.target.unwrap();
        assert_ne!(source.hash, target.hash);
        assert_eq!(diff.size_diff, Some(10 - 12));
    }

    #[test]
    fn identical_content_with_newer_target_mtime_still_compares_identical() {
        // The hash comparator and the mtime conflict gate must disagree here:
        // same bytes, target touched later.
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write(source.path(), "a.txt", "same bytes");
        write(target.path(), "a.txt", "same bytes");
        set_mtime(source.path(), "a.txt", 1_000_000);
        set_mtime(target.path(), "a.txt", 2_000_000);

        let comparison =
            compare_files(&source.path().join("a.txt"), &target.path().join("a.txt")).unwrap();
        assert_eq!(comparison.status, ComparisonStatus::Identical);

        let conflicts = check_conflicts(&["a.txt".to_string()], source.path(), target.path());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::NewerInTarget);
    }

    #[test]
    fn batch_tallies_by_status() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write(source.path(), "same.txt", "alpha");
        write(target.path(), "same.txt", "alpha");
        write(source.path(), "diff.txt", "beta");
        write(target.path(), "diff.txt", "gamma!");
        write(source.path(), "fresh.txt", "delta");

        let files = vec![
            "same.txt".to_string(),
            "diff.txt".to_string(),
            "fresh.txt".to_string(),
            "ghost.txt".to_string(),
        ];
        let report =
            compare_batch(&files, source.path(), target.path(), "local", "production").unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.identical, 1);
        assert_eq!(report.different, 1);
        assert_eq!(report.new, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.files[0].source_env, "local");
        assert_eq!(report.files[0].target_env, "production");
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let report = compare_batch(&[], source.path(), target.path(), "a", "b").unwrap();
        assert_eq!(report.total, 0);
        assert!(report.files.is_empty());
    }
}
