//! Pre-overwrite backup archives.
//!
//! Before a push or pull overwrites files at a target, the archiver packages
//! the target's current copies into a gzip-compressed tarball in a single
//! flat backup directory. Archives are immutable once written; only the
//! retention sweep deletes them. Restore reads an archive and extracts it,
//! never consuming or modifying it.

use crate::audit::AuditLog;
use crate::error::{Result, SyncError};
use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_MAX_BACKUPS: usize = 50;

const ARCHIVE_EXT: &str = ".tar.gz";

/// Owns the backup directory's contents. Nothing else writes there.
pub struct BackupArchiver {
    backup_dir: PathBuf,
    max_backups: usize,
}

impl BackupArchiver {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Archive the listed files as they currently exist under `path`.
    ///
    /// Files missing at `path` are silently skipped: they are about to be
    /// created by the transfer, not overwritten, so there is nothing to
    /// preserve. The archive name carries user, timestamp and environment so
    /// concurrent operations by the same user on different environments
    /// cannot collide. Returns the archive filename; a successful write
    /// triggers the retention sweep.
    pub fn create_backup(
        &self,
        files: &[String],
        path: &Path,
        env: &str,
        user: &str,
        audit: &dyn AuditLog,
    ) -> Result<String> {
        fs::create_dir_all(&self.backup_dir).map_err(SyncError::Io)?;

        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("{}_backup_{}_{}{}", user, timestamp, env, ARCHIVE_EXT);
        let archive_path = self.backup_dir.join(&name);

        let file = File::create(&archive_path).map_err(SyncError::Io)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for file_ref in files {
            let full_path = path.join(file_ref);
            if full_path.is_file() {
                builder
                    .append_path_with_name(&full_path, file_ref)
                    .map_err(SyncError::Io)?;
            }
        }

        let encoder = builder.into_inner().map_err(SyncError::Io)?;
        encoder.finish().map_err(SyncError::Io)?;

        audit.record(user, &format!("BACKUP created: {}", name));
        self.clean_old_backups(user, audit)?;

        Ok(name)
    }

    /// Extract every entry of the named archive into `target_path`, creating
    /// intermediate directories, and return the extracted relative paths.
    /// Entries that would escape the target are not unpacked.
    pub fn restore(&self, backup_file: &str, target_path: &Path) -> Result<Vec<String>> {
        let archive_path = self.backup_dir.join(backup_file);
        if !archive_path.is_file() {
            return Err(SyncError::Backup(format!(
                "backup not found: {}",
                backup_file
            )));
        }

        let file = File::open(&archive_path).map_err(SyncError::Io)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));

        let mut extracted = Vec::new();
        for entry in archive.entries().map_err(SyncError::Io)? {
            let mut entry = entry.map_err(SyncError::Io)?;
            let name = entry
                .path()
                .map_err(SyncError::Io)?
                .to_string_lossy()
                .replace('\\', "/");
            if matches!(entry.unpack_in(target_path), Ok(true)) {
                extracted.push(name);
            }
        }

        Ok(extracted)
    }

    /// Archive filenames, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }
        Ok(self
            .archives_by_age()?
            .into_iter()
            .filter_map(|(path, _)| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .collect())
    }

    /// Keep the `max_backups` most recent archives, delete the rest. Runs
    /// after every backup creation, so disk usage is bounded by operation
    /// count rather than age.
    fn clean_old_backups(&self, user: &str, audit: &dyn AuditLog) -> Result<()> {
        let mut archives = self.archives_by_age()?;
        if archives.len() <= self.max_backups {
            return Ok(());
        }

        for (path, _) in archives.split_off(self.max_backups) {
            if fs::remove_file(&path).is_ok() {
                if let Some(name) = path.file_name() {
                    audit.record(
                        user,
                        &format!("CLEANUP: backup removed - {}", name.to_string_lossy()),
                    );
                }
            }
        }

        Ok(())
    }

    fn archives_by_age(&self) -> Result<Vec<(PathBuf, SystemTime)>> {
        let mut archives = Vec::new();
        for entry in fs::read_dir(&self.backup_dir).map_err(SyncError::Io)? {
            let entry = entry.map_err(SyncError::Io)?;
            let path = entry.path();
            let is_archive = path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(ARCHIVE_EXT))
                .unwrap_or(false);
            if !is_archive || !path.is_file() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|md| md.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            archives.push((path, modified));
        }
        archives.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(archives)
    }
}
