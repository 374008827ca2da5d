//! Durable operation history.
//!
//! The ledger is one JSON array on disk, read fully at open and rewritten
//! wholesale on every mutation. Entries are kept newest-first and capped at
//! [`MAX_ENTRIES`]; an entry is immutable once written. Callers that share a
//! ledger across threads must serialize access (see [`crate::api::SyncApi`],
//! which guards it with a mutex).

use crate::error::{Result, SyncError};
use crate::model::{HistoryEntry, LedgerStats, SyncAction};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

pub const MAX_ENTRIES: usize = 1000;

pub struct OperationLedger {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl OperationLedger {
    /// Load the full history from `path`. A missing file is an empty ledger;
    /// an unreadable document also resets to empty rather than bricking
    /// every operation behind a parse error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(SyncError::Io)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    /// Record one completed operation and return its id.
    ///
    /// The entry is created in a single write with everything known up
    /// front, including the backup filename when one was produced; there is
    /// no later attach step. Ids are v4 UUIDs, unique even under rapid
    /// successive calls.
    #[allow(clippy::too_many_arguments)]
    pub fn add_entry(
        &mut self,
        action: SyncAction,
        files: Vec<String>,
        from: &str,
        to: &str,
        user: &str,
        notes: String,
        backup_file: Option<String>,
    ) -> Result<Uuid> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user: user.to_string(),
            action,
            from: from.to_string(),
            to: to.to_string(),
            file_count: files.len(),
            files,
            notes,
            backup_file,
        };
        let id = entry.id;

        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
        self.save()?;

        Ok(id)
    }

    /// Up to `limit` entries, newest first. Optional user and action filters
    /// compose with AND.
    pub fn history(
        &self,
        limit: usize,
        user: Option<&str>,
        action: Option<SyncAction>,
    ) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| user.is_none_or(|u| entry.user == u))
            .filter(|entry| action.is_none_or(|a| entry.action == a))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn entry(&self, id: &Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    /// Most recent entries that touched the given file.
    pub fn recent_for_file(&self, file: &str, limit: usize) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.files.iter().any(|f| f == file))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total_operations: self.entries.len(),
            ..LedgerStats::default()
        };

        for entry in &self.entries {
            *stats.by_action.entry(entry.action.to_string()).or_insert(0) += 1;
            *stats.by_user.entry(entry.user.clone()).or_insert(0) += 1;
            let day = entry.timestamp.date_naive().to_string();
            *stats.by_day.entry(day).or_insert(0) += 1;
        }

        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(SyncError::Io)?;
            }
        }
        let content =
            serde_json::to_string_pretty(&self.entries).map_err(SyncError::Serialization)?;
        fs::write(&self.path, content).map_err(SyncError::Io)?;
        Ok(())
    }
}
