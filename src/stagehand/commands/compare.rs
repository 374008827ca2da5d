//! Compare: read-only content diff between two environments.

use crate::diff;
use crate::error::{Result, SyncError};
use crate::model::CompareReport;
use crate::registry::EnvRegistry;

pub fn run<R: EnvRegistry>(
    registry: &R,
    files: &[String],
    source_env: &str,
    target_env: &str,
) -> Result<CompareReport> {
    let source_path = registry
        .resolve(source_env)
        .ok_or_else(|| SyncError::UnknownEnvironment(source_env.to_string()))?;
    let target_path = registry
        .resolve(target_env)
        .ok_or_else(|| SyncError::UnknownEnvironment(target_env.to_string()))?;

    diff::compare_batch(files, &source_path, &target_path, source_env, target_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticRegistry;
    use std::fs;

    #[test]
    fn resolves_environments_and_delegates() {
        let local = tempfile::tempdir().unwrap();
        let production = tempfile::tempdir().unwrap();
        fs::write(local.path().join("a.txt"), "same").unwrap();
        fs::write(production.path().join("a.txt"), "same").unwrap();

        let registry = StaticRegistry::new()
            .with_env("local", local.path())
            .with_env("production", production.path());

        let report = run(&registry, &["a.txt".to_string()], "local", "production").unwrap();
        assert_eq!(report.identical, 1);

        let err = run(&registry, &[], "local", "mars").unwrap_err();
        assert!(matches!(err, SyncError::UnknownEnvironment(_)));
    }
}
