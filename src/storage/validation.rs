//! Path validation
//!
//! Maps untrusted client-relative paths onto the active root directory.
//! Sanitization and joining are kept as separate steps: a relative path is
//! split on `/`, every segment goes through [`sanitize_name`], and only the
//! sanitized segments are ever joined onto the root.

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::sanitize::sanitize_name;

/// Split a client path on `/`, drop empty segments, sanitize the rest.
pub fn sanitized_segments(relative_path: &str) -> Vec<String> {
    relative_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_name)
        .collect()
}

/// Normalize a client path into its canonical client-relative form:
/// sanitized segments joined by `/`, no leading or trailing slash.
pub fn normalize_relative_path(relative_path: &str) -> String {
    sanitized_segments(relative_path).join("/")
}

/// Join a client-relative path onto the root. Never leaves the root's subtree.
///
/// An empty (or all-slash) relative path resolves to the root itself.
pub fn resolve_path(root: &Path, relative_path: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for segment in sanitized_segments(relative_path) {
        resolved.push(segment);
    }
    resolved
}

/// Resolve a path that must name something below the root, not the root itself.
///
/// Returns the real path together with the normalized client-relative path.
pub fn resolve_target(
    root: &Path,
    relative_path: &str,
) -> Result<(PathBuf, String), StorageError> {
    let normalized = require_target(relative_path)?;
    Ok((resolve_path(root, &normalized), normalized))
}

/// Sanitize a requested leaf name, rejecting names that are empty to begin with.
pub fn validate_name(name: &str) -> Result<String, StorageError> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidPath("Empty name".into()));
    }
    Ok(sanitize_name(name))
}

/// Client-relative path of `name` inside the (already normalized) `parent`.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// True if `candidate` equals `ancestor` or lies somewhere beneath it.
///
/// Compared segment by segment on sanitized paths, so `docs` is not treated
/// as an ancestor of `docs2`.
pub fn is_same_or_descendant(ancestor: &str, candidate: &str) -> bool {
    let ancestor = sanitized_segments(ancestor);
    let candidate = sanitized_segments(candidate);
    candidate.len() >= ancestor.len() && candidate[..ancestor.len()] == ancestor[..]
}

/// Reject moving an entry onto itself or into one of its own descendants.
///
/// Applied by request handlers before the move primitive runs. Either side
/// naming the root itself is an [`StorageError::InvalidPath`].
pub fn validate_move(source: &str, destination: &str) -> Result<(), StorageError> {
    let source_path = require_target(source)?;
    let destination = require_target(destination)?;
    if is_same_or_descendant(&source_path, &destination) {
        return Err(StorageError::MoveIntoSelf {
            source_path,
            destination,
        });
    }
    Ok(())
}

fn require_target(relative_path: &str) -> Result<String, StorageError> {
    let normalized = normalize_relative_path(relative_path);
    if normalized.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "'{}' does not name an entry below the root",
            relative_path
        )));
    }
    Ok(normalized)
}
