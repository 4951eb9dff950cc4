//! Path-scoped file manager
//!
//! Every call asks the [`LocationStore`] for the active root, then runs the
//! blocking storage primitive against it on tokio's blocking pool. Nothing
//! about directory contents is cached between calls.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::FileManagerError;
use crate::locations::{ConfigPatch, LocationStore, RootConfiguration};
use crate::storage::{
    self, CreateOutcome, DeleteOutcome, Download, Entry, MoveOutcome,
};

/// One file in a multi-file upload
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a multi-file upload. Items are attempted independently.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub stored: Vec<Entry>,
    pub failed: Vec<(String, FileManagerError)>,
}

#[derive(Clone, Debug)]
pub struct FileManager {
    locations: Arc<LocationStore>,
}

impl FileManager {
    pub fn new(locations: Arc<LocationStore>) -> Self {
        Self { locations }
    }

    pub async fn active_root(&self) -> PathBuf {
        self.locations.active_root_path().await
    }

    pub async fn list(&self, relative_path: &str) -> Result<Vec<Entry>, FileManagerError> {
        let root = self.active_root().await;
        let relative_path = relative_path.to_string();
        let entries =
            tokio::task::spawn_blocking(move || storage::list_directory(&root, &relative_path))
                .await??;
        Ok(entries)
    }

    pub async fn create_folder(
        &self,
        name: &str,
        parent_path: &str,
    ) -> Result<CreateOutcome, FileManagerError> {
        let root = self.active_root().await;
        let name = name.to_string();
        let parent_path = parent_path.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            storage::create_folder(&root, &name, &parent_path)
        })
        .await??;
        Ok(outcome)
    }

    pub async fn delete(&self, relative_path: &str) -> Result<DeleteOutcome, FileManagerError> {
        let root = self.active_root().await;
        let relative_path = relative_path.to_string();
        let outcome =
            tokio::task::spawn_blocking(move || storage::delete_path(&root, &relative_path))
                .await??;
        Ok(outcome)
    }

    /// Moves an entry within the active root. Does not reject moving a
    /// directory into itself; see [`storage::validate_move`].
    pub async fn move_entry(
        &self,
        source_path: &str,
        destination_path: &str,
    ) -> Result<MoveOutcome, FileManagerError> {
        let root = self.active_root().await;
        let source_path = source_path.to_string();
        let destination_path = destination_path.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            storage::move_path(&root, &source_path, &destination_path)
        })
        .await??;
        Ok(outcome)
    }

    pub async fn save_file(
        &self,
        name: &str,
        bytes: Vec<u8>,
        parent_path: &str,
    ) -> Result<Entry, FileManagerError> {
        let root = self.active_root().await;
        let name = name.to_string();
        let parent_path = parent_path.to_string();
        let entry = tokio::task::spawn_blocking(move || {
            storage::save_file(&root, &name, &bytes, &parent_path)
        })
        .await??;
        Ok(entry)
    }

    /// Stores each item in turn. A failed item neither stops the remaining
    /// ones nor rolls back those already written.
    pub async fn upload(&self, items: Vec<UploadItem>, parent_path: &str) -> UploadReport {
        let mut report = UploadReport::default();
        for item in items {
            match self.save_file(&item.name, item.bytes, parent_path).await {
                Ok(entry) => report.stored.push(entry),
                Err(e) => report.failed.push((item.name, e)),
            }
        }
        report
    }

    pub async fn open(&self, relative_path: &str) -> Result<Download, FileManagerError> {
        let root = self.active_root().await;
        let relative_path = relative_path.to_string();
        let download =
            tokio::task::spawn_blocking(move || storage::open_file(&root, &relative_path))
                .await??;
        Ok(download)
    }

    pub async fn configuration(&self) -> RootConfiguration {
        self.locations.load().await
    }

    pub async fn update_configuration(
        &self,
        patch: ConfigPatch,
    ) -> Result<RootConfiguration, FileManagerError> {
        Ok(self.locations.save(patch).await?)
    }
}
