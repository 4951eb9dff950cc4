//! Storage operations
//!
//! Directory primitives (list, create folder, delete, move) over a root
//! directory and client-relative paths. All functions are blocking; the
//! [`FileManager`](crate::manager::FileManager) runs them on the blocking pool.

use log::{debug, info, warn};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::storage::entry::{Entry, EntryStats, RESERVED_ENTRY_NAME, build_entry, sort_entries};
use crate::storage::results::{CreateOutcome, DeleteOutcome, MoveOutcome};
use crate::storage::sanitize::sanitize_name;
use crate::storage::validation::{
    join_relative, normalize_relative_path, resolve_path, resolve_target, validate_name,
};

/// Lists the contents of a directory.
///
/// A missing target, or one that is not a directory, lists as empty. Other
/// failures to open the directory are returned as [`StorageError::Io`].
pub fn list_directory(root: &Path, relative_path: &str) -> Result<Vec<Entry>, StorageError> {
    let parent = normalize_relative_path(relative_path);
    let real_path = resolve_path(root, &parent);

    match fs::metadata(&real_path) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            debug!("List target {} is not a directory", real_path.display());
            return Ok(Vec::new());
        }
        Err(e) if is_absent(&e) => {
            debug!("List target {} does not exist yet", real_path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(&real_path)? {
        let dir_entry = match dir_entry {
            Ok(dir_entry) => dir_entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", real_path.display(), e);
                continue;
            }
        };

        let raw_name = match dir_entry.file_name().into_string() {
            Ok(name) => name,
            Err(name) => {
                warn!("Skipping non UTF-8 name {:?} in {}", name, real_path.display());
                continue;
            }
        };
        if raw_name == RESERVED_ENTRY_NAME {
            continue;
        }
        // No request path can reach a name the sanitizer would rewrite.
        if sanitize_name(&raw_name) != raw_name {
            warn!("Skipping unaddressable name '{}' in {}", raw_name, real_path.display());
            continue;
        }

        // Follow symlinks; fall back to the link itself when the target is gone.
        let metadata = match fs::metadata(dir_entry.path()).or_else(|_| dir_entry.metadata()) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {}: {}", dir_entry.path().display(), e);
                continue;
            }
        };

        entries.push(build_entry(EntryStats::from(&metadata), &raw_name, &parent));
    }

    sort_entries(&mut entries);

    info!(
        "Listed directory '{}' (real: {}) - {} entries",
        parent,
        real_path.display(),
        entries.len()
    );

    Ok(entries)
}

/// Creates a folder named `name` inside `parent_path`, including any missing
/// intermediate directories. An existing folder is not an error.
pub fn create_folder(
    root: &Path,
    name: &str,
    parent_path: &str,
) -> Result<CreateOutcome, StorageError> {
    let folder_name = validate_name(name)?;
    let parent = normalize_relative_path(parent_path);
    let relative = join_relative(&parent, &folder_name);
    let real_path = resolve_path(root, &relative);

    let existed = real_path.is_dir();
    if !existed {
        fs::create_dir_all(&real_path)?;
        info!("Created folder '{}' (real: {})", relative, real_path.display());
    } else {
        debug!("Folder '{}' already exists", relative);
    }

    let metadata = fs::metadata(&real_path)?;
    let entry = build_entry(EntryStats::from(&metadata), &folder_name, &parent);

    Ok(if existed {
        CreateOutcome::AlreadyExisted(entry)
    } else {
        CreateOutcome::Created(entry)
    })
}

/// Deletes a file, or a directory with all its contents.
///
/// A target that is already gone yields [`DeleteOutcome::AlreadyAbsent`].
pub fn delete_path(root: &Path, relative_path: &str) -> Result<DeleteOutcome, StorageError> {
    let (real_path, relative) = resolve_target(root, relative_path)?;

    // symlink_metadata: a link to a directory is removed as a link.
    let metadata = match fs::symlink_metadata(&real_path) {
        Ok(metadata) => metadata,
        Err(e) if is_absent(&e) => {
            debug!("Delete target '{}' already absent", relative);
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        Err(e) => return Err(e.into()),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(&real_path)
    } else {
        fs::remove_file(&real_path)
    };

    match removed {
        Ok(()) => {
            info!("Deleted '{}' (real: {})", relative, real_path.display());
            Ok(DeleteOutcome::Removed)
        }
        // Lost a race with another delete.
        Err(e) if is_absent(&e) => Ok(DeleteOutcome::AlreadyAbsent),
        Err(e) => Err(e.into()),
    }
}

/// Moves `source_path` to `destination_path`, creating missing parents of
/// the destination.
///
/// Uses an atomic rename; only when source and destination sit on different
/// devices does it fall back to copy-then-delete, which is not atomic and can
/// leave both copies behind if the delete fails.
///
/// Does not guard against moving a directory into itself; callers check
/// that with [`validate_move`](crate::storage::validation::validate_move).
pub fn move_path(
    root: &Path,
    source_path: &str,
    destination_path: &str,
) -> Result<MoveOutcome, StorageError> {
    move_with(root, source_path, destination_path, |from, to| fs::rename(from, to))
}

fn move_with<R>(
    root: &Path,
    source_path: &str,
    destination_path: &str,
    rename: R,
) -> Result<MoveOutcome, StorageError>
where
    R: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let (source, source_rel) = resolve_target(root, source_path)?;
    let (destination, destination_rel) = resolve_target(root, destination_path)?;

    match fs::symlink_metadata(&source) {
        Ok(_) => {}
        Err(e) if is_absent(&e) => return Err(StorageError::NotFound(source_rel)),
        Err(e) => return Err(e.into()),
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let outcome = match rename(&source, &destination) {
        Ok(()) => MoveOutcome::Renamed,
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(
                "Rename of '{}' crosses devices, copying instead",
                source_rel
            );
            copy_then_remove(&source, &destination)?;
            MoveOutcome::Copied
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Moved '{}' to '{}' ({:?})",
        source_rel, destination_rel, outcome
    );

    Ok(outcome)
}

/// True for errors meaning the path does not exist, including a path that
/// runs through a regular file (`a.txt/sub`).
pub(crate) fn is_absent(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Copies `source` (file or directory tree) to `destination`, then removes
/// `source`.
pub(crate) fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::symlink_metadata(source)?.is_dir() {
        for item in WalkDir::new(source) {
            let item = item.map_err(io::Error::other)?;
            let relative = item
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let target = destination.join(relative);
            if item.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(item.path(), &target)?;
            }
        }
        fs::remove_dir_all(source)
    } else {
        fs::copy(source, destination)?;
        fs::remove_file(source)
    }
}
