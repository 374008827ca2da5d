//! Push: copy files from a source environment to one or more targets.
//!
//! Targets are processed independently; nothing that goes wrong with one
//! target stops the others. Within a target the pipeline is: validate the
//! directory, check conflicts (unless forced), back up the files about to be
//! overwritten (if requested), copy file by file, then write one history
//! entry covering the files that actually made it.

use super::PushReport;
use crate::audit::AuditLog;
use crate::backup::BackupArchiver;
use crate::diff;
use crate::ledger::OperationLedger;
use crate::model::SyncAction;
use crate::registry::EnvRegistry;
use std::fs;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run<R: EnvRegistry>(
    registry: &R,
    ledger: &mut OperationLedger,
    archiver: &BackupArchiver,
    audit: &dyn AuditLog,
    user: &str,
    files: &[String],
    source_env: &str,
    target_envs: &[String],
    create_backup: bool,
    force: bool,
) -> PushReport {
    let mut report = PushReport::default();

    let Some(source_path) = registry.resolve(source_env) else {
        report
            .errors
            .push(format!("invalid source environment: {}", source_env));
        return report;
    };
    if !source_path.is_dir() {
        report.errors.push(format!(
            "source path does not exist or is not accessible: {}",
            source_path.display()
        ));
        return report;
    }

    for target_env in target_envs {
        let Some(target_path) = registry.resolve(target_env) else {
            report
                .errors
                .push(format!("invalid target environment: {}", target_env));
            continue;
        };

        if !target_path.is_dir() {
            report.errors.push(format!(
                "target path does not exist: {} (environment: {})",
                target_path.display(),
                target_env
            ));
            continue;
        }

        if is_read_only(&target_path) {
            report.errors.push(format!(
                "no write permission on: {} (environment: {})",
                target_path.display(),
                target_env
            ));
            continue;
        }

        if !force {
            let conflicts = diff::check_conflicts(files, &source_path, &target_path);
            if !conflicts.is_empty() {
                report.conflicts.insert(target_env.clone(), conflicts);
                continue;
            }
        }

        // Snapshot the target's current copies before anything is touched.
        let mut backup_file = None;
        if create_backup {
            match archiver.create_backup(files, &target_path, target_env, user, audit) {
                Ok(name) => {
                    report.backups.insert(target_env.clone(), name.clone());
                    backup_file = Some(name);
                }
                Err(e) => {
                    report.errors.push(format!(
                        "failed to create backup for {}: {}",
                        target_env, e
                    ));
                    continue;
                }
            }
        }

        let mut copied = Vec::new();
        let mut errors = Vec::new();

        for file in files {
            let source_file = source_path.join(file);
            let target_file = target_path.join(file);

            if !source_file.exists() {
                errors.push(format!("file {} not found in source", file));
                continue;
            }

            let target_dir = match target_file.parent() {
                Some(dir)
                    if !dir.as_os_str().is_empty()
                        && dir != Path::new(".")
                        && dir != Path::new("..") =>
                {
                    dir
                }
                _ => {
                    errors.push(format!("invalid target path for: {}", file));
                    continue;
                }
            };

            if !target_dir.is_dir() {
                if let Err(e) = fs::create_dir_all(target_dir) {
                    errors.push(format!("failed to create directory for {}: {}", file, e));
                    continue;
                }
            }

            match fs::copy(&source_file, &target_file) {
                Ok(_) => {
                    copied.push(file.clone());
                    audit.record(
                        user,
                        &format!("PUSH: {} -> {}: {}", source_env, target_env, file),
                    );
                }
                Err(e) => errors.push(format!("failed to copy {}: {}", file, e)),
            }
        }

        if !copied.is_empty() {
            let notes = format!("{} file(s) pushed", copied.len());
            if let Err(e) = ledger.add_entry(
                SyncAction::Push,
                copied.clone(),
                source_env,
                target_env,
                user,
                notes,
                backup_file,
            ) {
                // The copies already happened; a ledger failure is additive,
                // never retroactive.
                report
                    .errors
                    .push(format!("failed to record history: {}", e));
            }
            report.success.insert(target_env.clone(), copied);
        }

        if !errors.is_empty() {
            report.file_errors.insert(target_env.clone(), errors);
        }
    }

    report
}

fn is_read_only(path: &Path) -> bool {
    fs::metadata(path)
        .map(|md| md.permissions().readonly())
        .unwrap_or(true)
}
