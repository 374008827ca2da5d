//! Settings for the CLI front-end.
//!
//! Environments live in a dotenv-style file: `KEY=VALUE` lines, `#`
//! comments, optional quoting. `LOCAL_PATH` maps to the `local` environment,
//! every `DEV_<NAME>` to a lowercased developer sandbox, and `PROD_PATH` to
//! `production`. State locations (backup directory, history file, audit log)
//! default to the user data directory and can be overridden from the same
//! file.
//!
//! The core never reads this; `main.rs` loads settings, builds the registry
//! and hands the resolved pieces to [`crate::api::SyncApi`].

use crate::backup::DEFAULT_MAX_BACKUPS;
use crate::error::{Result, SyncError};
use crate::registry::StaticRegistry;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Settings {
    pub user: String,
    pub environments: Vec<(String, PathBuf)>,
    pub backup_dir: PathBuf,
    pub history_file: PathBuf,
    pub log_file: PathBuf,
    pub max_backups: usize,
}

impl Settings {
    /// Parse the settings file, with state-file defaults under `data_dir`.
    pub fn load(env_file: &Path, data_dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(env_file).map_err(|_| {
            SyncError::Config(format!("settings file not found: {}", env_file.display()))
        })?;

        let vars = parse_env_lines(&content);
        let get = |key: &str| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let mut environments = Vec::new();
        if let Some(path) = get("LOCAL_PATH") {
            environments.push(("local".to_string(), PathBuf::from(path)));
        }
        for (key, value) in &vars {
            if let Some(name) = key.strip_prefix("DEV_") {
                environments.push((name.to_lowercase(), PathBuf::from(value)));
            }
        }
        if let Some(path) = get("PROD_PATH") {
            environments.push(("production".to_string(), PathBuf::from(path)));
        }

        if environments.is_empty() {
            return Err(SyncError::Config(format!(
                "no environments defined in {}",
                env_file.display()
            )));
        }

        let user = get("SYNC_USER")
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            user,
            environments,
            backup_dir: get("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("backups")),
            history_file: get("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("history.json")),
            log_file: get("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("sync.log")),
            max_backups: get("MAX_BACKUPS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BACKUPS),
        })
    }

    pub fn registry(&self) -> StaticRegistry {
        StaticRegistry::from_pairs(self.environments.clone())
    }

    /// Create the state directories up front so first use does not fail on a
    /// missing parent.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.backup_dir).map_err(SyncError::Io)?;
        for file in [&self.history_file, &self.log_file] {
            if let Some(parent) = file.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(SyncError::Io)?;
                }
            }
        }
        Ok(())
    }
}

fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(['"', '\'']).to_string();
        vars.push((key.trim().to_string(), value));
    }
    vars
}
