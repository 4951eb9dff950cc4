//! Error types
//!
//! Defines domain-specific error types for each module of the file manager.

use std::io;

/// Storage module errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Cannot move {source_path} into itself ({destination})")]
    MoveIntoSelf {
        source_path: String,
        destination: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Root configuration store errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("Failed to persist configuration to {path}: {source}")]
    Persistence { path: String, source: io::Error },
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("At least one default location is required")]
    NoLocations,
}

/// General file manager error that encompasses all error types
#[derive(Debug, thiserror::Error)]
pub enum FileManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigStoreError),
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for FileManagerError {
    fn from(error: tokio::task::JoinError) -> Self {
        FileManagerError::TaskFailed(error.to_string())
    }
}
