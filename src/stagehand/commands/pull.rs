//! Pull: copy files from a remote environment into the local one.
//!
//! Single source/target pair, no fan-out. Any conflict short-circuits the
//! whole call; the backup (when requested) snapshots the destination side,
//! since that is what the pull overwrites.

use super::PullReport;
use crate::audit::AuditLog;
use crate::backup::BackupArchiver;
use crate::diff;
use crate::error::{Result, SyncError};
use crate::ledger::OperationLedger;
use crate::model::SyncAction;
use crate::registry::EnvRegistry;
use std::fs;

#[allow(clippy::too_many_arguments)]
pub fn run<R: EnvRegistry>(
    registry: &R,
    ledger: &mut OperationLedger,
    archiver: &BackupArchiver,
    audit: &dyn AuditLog,
    user: &str,
    files: &[String],
    source_env: &str,
    target_env: &str,
    create_backup: bool,
    force: bool,
) -> Result<PullReport> {
    let source_path = registry
        .resolve(source_env)
        .ok_or_else(|| SyncError::UnknownEnvironment(source_env.to_string()))?;
    let target_path = registry
        .resolve(target_env)
        .ok_or_else(|| SyncError::UnknownEnvironment(target_env.to_string()))?;

    let mut report = PullReport::default();

    if !force {
        let conflicts = diff::check_conflicts(files, &source_path, &target_path);
        if !conflicts.is_empty() {
            report.conflicts = conflicts;
            return Ok(report);
        }
    }

    if create_backup {
        let name = archiver.create_backup(files, &target_path, target_env, user, audit)?;
        report.backup = Some(name);
    }

    for file in files {
        let source_file = source_path.join(file);
        let target_file = target_path.join(file);

        if !source_file.exists() {
            report
                .errors
                .push(format!("file {} not found in {}", file, source_env));
            continue;
        }

        if let Some(target_dir) = target_file.parent() {
            if !target_dir.is_dir() {
                let _ = fs::create_dir_all(target_dir);
            }
        }

        match fs::copy(&source_file, &target_file) {
            Ok(_) => {
                report.success.push(file.clone());
                audit.record(
                    user,
                    &format!("PULL: {} -> {}: {}", source_env, target_env, file),
                );
            }
            Err(e) => report.errors.push(format!("failed to pull {}: {}", file, e)),
        }
    }

    if !report.success.is_empty() {
        let notes = format!("{} file(s) pulled", report.success.len());
        ledger.add_entry(
            SyncAction::Pull,
            report.success.clone(),
            source_env,
            target_env,
            user,
            notes,
            report.backup.clone(),
        )?;
    }

    Ok(report)
}
