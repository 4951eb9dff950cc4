//! File system operations
//!
//! Write-for-upload and read-for-download primitives.

use log::info;
use std::fs::{self, File};
use std::path::Path;

use crate::error::StorageError;
use crate::storage::entry::{Entry, EntryStats, RESERVED_ENTRY_NAME, build_entry};
use crate::storage::operations::is_absent;
use crate::storage::results::Download;
use crate::storage::validation::{
    join_relative, normalize_relative_path, resolve_path, resolve_target, validate_name,
};

/// Writes `bytes` to `name` inside `parent_path`, creating the parent if
/// needed and overwriting any existing file of that name.
pub fn save_file(
    root: &Path,
    name: &str,
    bytes: &[u8],
    parent_path: &str,
) -> Result<Entry, StorageError> {
    let file_name = validate_name(name)?;
    if file_name == RESERVED_ENTRY_NAME {
        return Err(StorageError::InvalidPath(format!(
            "'{}' is a reserved name",
            RESERVED_ENTRY_NAME
        )));
    }

    let parent = normalize_relative_path(parent_path);
    let parent_real = resolve_path(root, &parent);
    fs::create_dir_all(&parent_real)?;

    let real_path = parent_real.join(&file_name);
    fs::write(&real_path, bytes)?;

    info!(
        "Stored '{}' (real: {}, {} bytes)",
        join_relative(&parent, &file_name),
        real_path.display(),
        bytes.len()
    );

    let metadata = fs::metadata(&real_path)?;
    Ok(build_entry(EntryStats::from(&metadata), &file_name, &parent))
}

/// Opens the regular file at `relative_path` for streaming.
///
/// A directory is reported as [`StorageError::NotAFile`]; callers treat it
/// the same as a missing file.
pub fn open_file(root: &Path, relative_path: &str) -> Result<Download, StorageError> {
    let (real_path, relative) = resolve_target(root, relative_path)?;

    let metadata = match fs::metadata(&real_path) {
        Ok(metadata) => metadata,
        Err(e) if is_absent(&e) => {
            return Err(StorageError::NotFound(relative));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(StorageError::NotAFile(relative));
    }

    let file = File::open(&real_path)?;
    let file_name = real_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let content_type = mime_guess::from_path(&real_path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    info!(
        "Prepared download of '{}' (real: {}, {} bytes)",
        relative,
        real_path.display(),
        metadata.len()
    );

    Ok(Download {
        file,
        file_name,
        content_type,
        len: metadata.len(),
    })
}
