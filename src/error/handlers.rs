//! Error handlers
//!
//! Maps domain errors onto HTTP status codes and logs them.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::{FileManagerError, StorageError};

/// Log a file manager error at a level matching its severity
pub fn handle_error(err: &FileManagerError) {
    match error_to_status(err) {
        status if status.is_server_error() => error!("File manager error: {}", err),
        _ => warn!("Rejected request: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &FileManagerError) -> StatusCode {
    match err {
        FileManagerError::Storage(storage) => match storage {
            StorageError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            StorageError::MoveIntoSelf { .. } => StatusCode::BAD_REQUEST,
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::NotAFile(_) => StatusCode::NOT_FOUND,
            StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        FileManagerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        FileManagerError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
