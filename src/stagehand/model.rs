use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The three ledger-recorded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Push,
    Pull,
    Restore,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Push => write!(f, "push"),
            SyncAction::Pull => write!(f, "pull"),
            SyncAction::Restore => write!(f, "restore"),
        }
    }
}

impl FromStr for SyncAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "push" => Ok(SyncAction::Push),
            "pull" => Ok(SyncAction::Pull),
            "restore" => Ok(SyncAction::Restore),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    MissingSource,
    NewerInTarget,
}

/// One blocking finding from the pre-transfer conflict check.
///
/// Timestamps are pre-formatted for display; the check itself compares raw
/// modification times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Identical,
    Different,
    NewFile,
    NotFoundSource,
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonStatus::Identical => write!(f, "identical"),
            ComparisonStatus::Different => write!(f, "different"),
            ComparisonStatus::NewFile => write!(f, "new"),
            ComparisonStatus::NotFoundSource => write!(f, "not found"),
        }
    }
}

/// Hash and metadata of one side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub hash: String,
    pub modified: String,
    pub size: u64,
    pub size_formatted: String,
}

/// Content-hash based verdict for a single file pair. Unlike
/// [`ConflictRecord`] this is purely informational and never blocks a
/// transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub status: ComparisonStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<FileSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newer_in_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_diff: Option<i64>,
}

impl Comparison {
    pub(crate) fn status_only(status: ComparisonStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            target: None,
            newer_in_source: None,
            size_diff: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub file: String,
    pub source_env: String,
    pub target_env: String,
    #[serde(flatten)]
    pub comparison: Comparison,
}

/// Batch comparison result with per-status tallies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareReport {
    pub total: usize,
    pub identical: usize,
    pub different: usize,
    pub new: usize,
    pub not_found: usize,
    pub files: Vec<ComparisonRecord>,
}

/// One completed, ledger-recorded operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: SyncAction,
    pub from: String,
    pub to: String,
    pub files: Vec<String>,
    pub file_count: usize,
    pub notes: String,
    pub backup_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_operations: usize,
    pub by_action: BTreeMap<String, usize>,
    pub by_user: BTreeMap<String, usize>,
    pub by_day: BTreeMap<String, usize>,
}

/// A row in a directory listing, relative to the environment root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
