//! Audit log sink.
//!
//! One human-readable line per copy/backup/restore/cleanup event, appended to
//! a log the engine never reads back. A failing sink must never fail the
//! operation that produced the event, so implementations swallow their own
//! I/O errors.

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub trait AuditLog {
    fn record(&self, user: &str, message: &str);
}

/// Appends timestamped lines to a plain text file.
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditLog for FileAuditLog {
    fn record(&self, user: &str, message: &str) {
        let line = format!(
            "[{}] [{}] {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            user,
            message
        );
        let opened = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = opened {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Discards every event. Used by tests and quiet callers.
#[derive(Debug, Default)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn record(&self, _user: &str, _message: &str) {}
}
