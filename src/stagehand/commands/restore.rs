//! Restore: extract a backup archive into an environment.
//!
//! Restore is an explicit, forceful overwrite; it never consults the
//! conflict check.

use crate::audit::AuditLog;
use crate::backup::BackupArchiver;
use crate::error::{Result, SyncError};
use crate::ledger::OperationLedger;
use crate::model::SyncAction;
use crate::registry::EnvRegistry;

pub fn run<R: EnvRegistry>(
    registry: &R,
    ledger: &mut OperationLedger,
    archiver: &BackupArchiver,
    audit: &dyn AuditLog,
    user: &str,
    backup_file: &str,
    target_env: &str,
) -> Result<Vec<String>> {
    let target_path = registry
        .resolve(target_env)
        .ok_or_else(|| SyncError::UnknownEnvironment(target_env.to_string()))?;

    let extracted = archiver.restore(backup_file, &target_path)?;

    // Same rule as push and pull: a history entry only when files actually
    // landed.
    if !extracted.is_empty() {
        ledger.add_entry(
            SyncAction::Restore,
            extracted.clone(),
            "backup",
            target_env,
            user,
            format!("restored from {}", backup_file),
            None,
        )?;
    }

    audit.record(user, &format!("RESTORE: {} -> {}", backup_file, target_env));

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NullAuditLog;
    use crate::registry::StaticRegistry;
    use std::fs;

    #[test]
    fn extracts_archive_and_records_history() {
        let env_dir = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        fs::write(env_dir.path().join("a.txt"), "v1").unwrap();

        let registry = StaticRegistry::new().with_env("production", env_dir.path());
        let archiver = BackupArchiver::new(state.path().join("backups"));
        let mut ledger = OperationLedger::open(state.path().join("history.json")).unwrap();

        let name = archiver
            .create_backup(
                &["a.txt".to_string()],
                env_dir.path(),
                "production",
                "roger",
                &NullAuditLog,
            )
            .unwrap();

        // The live file moves on; restore must bring v1 back.
        fs::write(env_dir.path().join("a.txt"), "v2").unwrap();

        let extracted = run(
            &registry,
            &mut ledger,
            &archiver,
            &NullAuditLog,
            "roger",
            &name,
            "production",
        )
        .unwrap();

        assert_eq!(extracted, vec!["a.txt".to_string()]);
        assert_eq!(fs::read_to_string(env_dir.path().join("a.txt")).unwrap(), "v1");

        let history = ledger.history(10, None, None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, SyncAction::Restore);
        assert_eq!(history[0].from, "backup");
        assert_eq!(history[0].to, "production");
        assert!(history[0].notes.contains(&name));
    }

    #[test]
    fn missing_archive_is_an_error_not_an_empty_result() {
        let env_dir = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let registry = StaticRegistry::new().with_env("production", env_dir.path());
        let archiver = BackupArchiver::new(state.path().join("backups"));
        let mut ledger = OperationLedger::open(state.path().join("history.json")).unwrap();

        let err = run(
            &registry,
            &mut ledger,
            &archiver,
            &NullAuditLog,
            "roger",
            "ghost.tar.gz",
            "production",
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::Backup(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_extraction_writes_no_history() {
        let env_dir = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let registry = StaticRegistry::new().with_env("production", env_dir.path());
        let archiver = BackupArchiver::new(state.path().join("backups"));
        let mut ledger = OperationLedger::open(state.path().join("history.json")).unwrap();

        // Backing up only files that do not exist yields an empty archive.
        let name = archiver
            .create_backup(
                &["nothing.txt".to_string()],
                env_dir.path(),
                "production",
                "roger",
                &NullAuditLog,
            )
            .unwrap();

        let extracted = run(
            &registry,
            &mut ledger,
            &archiver,
            &NullAuditLog,
            "roger",
            &name,
            "production",
        )
        .unwrap();

        assert!(extracted.is_empty());
        assert!(ledger.is_empty());
    }
}
