//! HTTP response payloads
//!
//! JSON bodies returned by the API and the error type handlers bail out with.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;
use serde::Serialize;

use crate::error::handlers::{error_to_status, handle_error};
use crate::error::{FileManagerError, StorageError};
use crate::storage::Entry;

/// `{ "success": bool }`
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<Entry>,
    pub failed: Vec<UploadFailure>,
}

/// Error returned from request handlers
#[derive(Debug)]
pub enum ApiError {
    Manager(FileManagerError),
    BadRequest(String),
    /// Malformed or oversized multipart body; carries axum's own status.
    Multipart(MultipartError),
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        ApiError::Multipart(error)
    }
}

impl From<FileManagerError> for ApiError {
    fn from(error: FileManagerError) -> Self {
        ApiError::Manager(error)
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError::Manager(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Manager(e) => {
                handle_error(&e);
                (error_to_status(&e), e.to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Multipart(e) => {
                warn!("Rejected multipart body: {}", e.body_text());
                (e.status(), e.body_text())
            }
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
