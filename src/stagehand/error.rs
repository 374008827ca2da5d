use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
