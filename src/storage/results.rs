//! Storage result types
//!
//! Tagged outcomes returned by storage operations. The HTTP surface only
//! exposes coarse booleans; the tags let callers and tests tell the
//! idempotent paths apart.

use std::fs::File;

use crate::storage::entry::Entry;

/// Result of a folder creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Entry),
    AlreadyExisted(Entry),
}

impl CreateOutcome {
    pub fn entry(&self) -> &Entry {
        match self {
            CreateOutcome::Created(entry) | CreateOutcome::AlreadyExisted(entry) => entry,
        }
    }

    pub fn into_entry(self) -> Entry {
        match self {
            CreateOutcome::Created(entry) | CreateOutcome::AlreadyExisted(entry) => entry,
        }
    }
}

/// Result of a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    AlreadyAbsent,
}

impl DeleteOutcome {
    /// `true` if something was removed
    pub fn removed(self) -> bool {
        self == DeleteOutcome::Removed
    }
}

/// How a move was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Atomic rename within one filesystem
    Renamed,
    /// Copy followed by removal of the source (cross-device)
    Copied,
}

/// An opened file ready to be streamed to a client
#[derive(Debug)]
pub struct Download {
    pub file: File,
    pub file_name: String,
    pub content_type: String,
    pub len: u64,
}
