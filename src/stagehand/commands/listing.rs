//! Read-only directory listings over one environment.
//!
//! These feed the caller's file picker; the selected relative paths come
//! back in as the file list of a push, pull or compare.

use crate::error::{Result, SyncError};
use crate::model::FileInfo;
use crate::registry::EnvRegistry;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Files under `folder` within the environment, newest first. An unknown
/// environment or missing folder yields an empty list.
pub fn list_files<R: EnvRegistry>(
    registry: &R,
    env: &str,
    folder: &str,
    recursive: bool,
) -> Result<Vec<FileInfo>> {
    let Some(root) = registry.resolve(env) else {
        return Ok(Vec::new());
    };

    let folder = folder.trim_matches(['/', '\\']);
    let full_path = if folder.is_empty() {
        root.clone()
    } else {
        root.join(folder)
    };
    if !full_path.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    collect_files(&root, &full_path, recursive, &mut files)?;
    files.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(files)
}

/// First-level directory names of the environment, preceded by the root
/// itself (empty string).
pub fn list_dirs<R: EnvRegistry>(registry: &R, env: &str) -> Result<Vec<String>> {
    let Some(root) = registry.resolve(env) else {
        return Ok(Vec::new());
    };
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = vec![String::new()];
    for entry in fs::read_dir(&root).map_err(SyncError::Io)? {
        let entry = entry.map_err(SyncError::Io)?;
        if entry.path().is_dir() {
            dirs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    dirs[1..].sort();
    Ok(dirs)
}

fn collect_files(
    root: &Path,
    dir: &Path,
    recursive: bool,
    out: &mut Vec<FileInfo>,
) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // Unreadable directory reads as empty, same as a missing one.
        Err(_) => return Ok(()),
    };

    for entry in entries {
        let entry = entry.map_err(SyncError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            if recursive {
                collect_files(root, &path, recursive, out)?;
            }
            continue;
        }
        if !path.is_file() {
            continue;
        }

        let Ok(md) = entry.metadata() else { continue };
        let name = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let modified: DateTime<Utc> = md
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .into();

        out.push(FileInfo {
            name,
            size: md.len(),
            modified,
        });
    }

    Ok(())
}
