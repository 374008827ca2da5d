//! Business logic for each sync operation.
//!
//! Commands are free functions over injected collaborators (registry,
//! ledger, archiver, audit sink). They return structured reports and never
//! print or exit; rendering belongs to the caller.

use crate::model::ConflictRecord;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod compare;
pub mod listing;
pub mod pull;
pub mod push;
pub mod restore;

/// Outcome of a fan-out push, keyed by target environment.
///
/// `errors` holds call- and target-scoped failures (bad environment,
/// unwritable directory, backup or ledger failure); `file_errors` holds the
/// per-file copy failures for each target. A target appears under `success`
/// only when at least one of its files copied.
#[derive(Debug, Default, Serialize)]
pub struct PushReport {
    pub success: BTreeMap<String, Vec<String>>,
    pub errors: Vec<String>,
    pub file_errors: BTreeMap<String, Vec<String>>,
    pub conflicts: BTreeMap<String, Vec<ConflictRecord>>,
    pub backups: BTreeMap<String, String>,
}

impl PushReport {
    /// True when every requested file reached every requested target.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.file_errors.is_empty() && self.conflicts.is_empty()
    }
}

/// Outcome of a single-pair pull.
#[derive(Debug, Default, Serialize)]
pub struct PullReport {
    pub success: Vec<String>,
    pub errors: Vec<String>,
    pub conflicts: Vec<ConflictRecord>,
    pub backup: Option<String>,
}

impl PullReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.conflicts.is_empty()
    }
}
