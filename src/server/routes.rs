//! Request handlers
//!
//! Thin adapters between the HTTP surface and [`FileManager`]. Handlers own
//! request parsing and policy checks that sit above the storage primitives,
//! such as refusing to move a directory into itself.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::info;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::handlers::error_to_status;
use crate::locations::{ConfigPatch, RootConfiguration};
use crate::manager::{FileManager, UploadItem};
use crate::server::responses::{ApiError, SuccessResponse, UploadFailure, UploadResponse};
use crate::storage::{CreateOutcome, Entry, sanitize_name, validate_move};

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: FileManager,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub source: String,
    pub destination: String,
}

pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    Ok(Json(state.manager.list(&query.path).await?))
}

/// Accepts one or more file parts. A text part named `path` overrides the
/// query string's target directory.
pub async fn upload_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut parent = query.path;
    let mut items = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let file_name = field.file_name().map(str::to_string);
        match file_name {
            Some(name) => {
                let bytes = field.bytes().await?;
                items.push(UploadItem {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            None if field.name() == Some("path") => {
                parent = field.text().await?;
            }
            None => {}
        }
    }

    if items.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".into()));
    }

    let report = state.manager.upload(items, &parent).await;
    let status = match report.failed.first() {
        Some((_, e)) if report.stored.is_empty() => error_to_status(e),
        _ => StatusCode::OK,
    };

    info!(
        "Upload to '{}': {} stored, {} failed",
        parent,
        report.stored.len(),
        report.failed.len()
    );

    let body = UploadResponse {
        success: report.failed.is_empty(),
        message: format!("{} file(s) uploaded", report.stored.len()),
        files: report.stored,
        failed: report
            .failed
            .into_iter()
            .map(|(name, e)| UploadFailure {
                name,
                error: e.to_string(),
            })
            .collect(),
    };

    Ok((status, Json(body)).into_response())
}

pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let download = state.manager.open(&query.path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&download.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.len));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            sanitize_name(&download.file_name)
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\"")),
    );

    let stream = ReaderStream::new(tokio::fs::File::from_std(download.file));
    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let outcome = state.manager.delete(&query.path).await?;
    Ok(Json(SuccessResponse {
        success: outcome.removed(),
    }))
}

pub async fn create_folder(
    State(state): State<AppState>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .manager
        .create_folder(&request.name, &request.path)
        .await?;
    let status = match outcome {
        CreateOutcome::Created(_) => StatusCode::CREATED,
        CreateOutcome::AlreadyExisted(_) => StatusCode::OK,
    };
    Ok((status, Json(outcome.into_entry())).into_response())
}

pub async fn move_file(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    validate_move(&request.source, &request.destination)?;
    state
        .manager
        .move_entry(&request.source, &request.destination)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn get_config(State(state): State<AppState>) -> Json<RootConfiguration> {
    Json(state.manager.configuration().await)
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<ConfigPatch>,
) -> Result<Json<RootConfiguration>, ApiError> {
    Ok(Json(state.manager.update_configuration(patch).await?))
}
