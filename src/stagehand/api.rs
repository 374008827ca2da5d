//! # API Facade
//!
//! Single entry point for all sync operations, regardless of the front-end
//! driving them. The facade owns the injected collaborators — environment
//! registry, operation ledger, backup archiver, audit sink — plus the caller
//! identity string, and dispatches into the command layer.
//!
//! Everything from here inward returns structured types and never touches
//! stdout, stderr or process exit codes; rendering is the caller's job.
//!
//! The ledger and the backup directory are shared mutable state on disk. A
//! single mutex serializes every operation that mutates or scans either, so
//! concurrent callers on one facade cannot interleave the ledger's
//! read-modify-write or race the retention sweep. Read-only filesystem
//! operations (compare, conflict check, listings) take no lock.

use crate::audit::AuditLog;
use crate::backup::BackupArchiver;
use crate::commands::{self, PullReport, PushReport};
use crate::diff;
use crate::error::{Result, SyncError};
use crate::ledger::OperationLedger;
use crate::model::{
    CompareReport, ConflictRecord, FileInfo, HistoryEntry, LedgerStats, SyncAction,
};
use crate::registry::EnvRegistry;
use parking_lot::Mutex;
use uuid::Uuid;

pub struct SyncApi<R: EnvRegistry, L: AuditLog> {
    registry: R,
    ledger: Mutex<OperationLedger>,
    archiver: BackupArchiver,
    audit: L,
    user: String,
}

impl<R: EnvRegistry, L: AuditLog> SyncApi<R, L> {
    pub fn new(
        registry: R,
        ledger: OperationLedger,
        archiver: BackupArchiver,
        audit: L,
        user: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            ledger: Mutex::new(ledger),
            archiver,
            audit,
            user: user.into(),
        }
    }

    /// Copy files from `source_env` to each of `target_envs`.
    pub fn push(
        &self,
        files: &[String],
        source_env: &str,
        target_envs: &[String],
        create_backup: bool,
        force: bool,
    ) -> PushReport {
        let mut ledger = self.ledger.lock();
        commands::push::run(
            &self.registry,
            &mut ledger,
            &self.archiver,
            &self.audit,
            &self.user,
            files,
            source_env,
            target_envs,
            create_backup,
            force,
        )
    }

    /// Copy files from `source_env` into `target_env` (usually `local`).
    pub fn pull(
        &self,
        files: &[String],
        source_env: &str,
        target_env: &str,
        create_backup: bool,
        force: bool,
    ) -> Result<PullReport> {
        let mut ledger = self.ledger.lock();
        commands::pull::run(
            &self.registry,
            &mut ledger,
            &self.archiver,
            &self.audit,
            &self.user,
            files,
            source_env,
            target_env,
            create_backup,
            force,
        )
    }

    /// Extract a backup archive into `target_env` and return the extracted
    /// relative paths.
    pub fn restore(&self, backup_file: &str, target_env: &str) -> Result<Vec<String>> {
        let mut ledger = self.ledger.lock();
        commands::restore::run(
            &self.registry,
            &mut ledger,
            &self.archiver,
            &self.audit,
            &self.user,
            backup_file,
            target_env,
        )
    }

    /// Content-hash comparison across two environments. Never blocks or
    /// records anything.
    pub fn compare(
        &self,
        files: &[String],
        source_env: &str,
        target_env: &str,
    ) -> Result<CompareReport> {
        commands::compare::run(&self.registry, files, source_env, target_env)
    }

    /// The mtime-based pre-transfer check, exposed standalone so callers can
    /// preview what a push or pull would block on.
    pub fn check_conflicts(
        &self,
        files: &[String],
        source_env: &str,
        target_env: &str,
    ) -> Result<Vec<ConflictRecord>> {
        let source_path = self
            .registry
            .resolve(source_env)
            .ok_or_else(|| SyncError::UnknownEnvironment(source_env.to_string()))?;
        let target_path = self
            .registry
            .resolve(target_env)
            .ok_or_else(|| SyncError::UnknownEnvironment(target_env.to_string()))?;
        Ok(diff::check_conflicts(files, &source_path, &target_path))
    }

    pub fn list_files(&self, env: &str, folder: &str, recursive: bool) -> Result<Vec<FileInfo>> {
        commands::listing::list_files(&self.registry, env, folder, recursive)
    }

    pub fn list_dirs(&self, env: &str) -> Result<Vec<String>> {
        commands::listing::list_dirs(&self.registry, env)
    }

    /// Backup archive names, newest first. Shares the mutating operations'
    /// critical section so the enumeration cannot race a retention sweep.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        let _ledger = self.ledger.lock();
        self.archiver.list_backups()
    }

    pub fn history(
        &self,
        limit: usize,
        user: Option<&str>,
        action: Option<SyncAction>,
    ) -> Vec<HistoryEntry> {
        self.ledger.lock().history(limit, user, action)
    }

    pub fn entry(&self, id: &Uuid) -> Option<HistoryEntry> {
        self.ledger.lock().entry(id).cloned()
    }

    pub fn recent_for_file(&self, file: &str, limit: usize) -> Vec<HistoryEntry> {
        self.ledger.lock().recent_for_file(file, limit)
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.lock().stats()
    }

    pub fn environments(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}
