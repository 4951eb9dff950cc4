//! Listing entries
//!
//! Turns already-collected filesystem metadata into the [`Entry`] records
//! returned to clients. Nothing here performs I/O.

use std::cmp::Ordering;
use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::validation::join_relative;

/// Bookkeeping file kept in otherwise-empty directories; never surfaced.
pub const RESERVED_ENTRY_NAME: &str = ".gitkeep";

/// Closed classification of listing entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Folder,
    Document,
    Image,
    Video,
    Audio,
    Archive,
    File,
}

impl EntryType {
    /// Classify an entry from its directory flag and name.
    pub fn classify(name: &str, is_directory: bool) -> Self {
        if is_directory {
            return EntryType::Folder;
        }
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return EntryType::File,
        };
        match extension.as_str() {
            "txt" | "md" | "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "odt"
            | "rtf" | "csv" | "json" | "xml" | "html" | "epub" => EntryType::Document,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" => {
                EntryType::Image
            }
            "mp4" | "webm" | "mkv" | "avi" | "mov" | "wmv" | "flv" => EntryType::Video,
            "mp3" | "wav" | "ogg" | "flac" | "aac" | "m4a" => EntryType::Audio,
            "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => EntryType::Archive,
            _ => EntryType::File,
        }
    }
}

/// Metadata record describing one file or directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub created_at: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// The subset of filesystem metadata an [`Entry`] is built from.
#[derive(Debug, Clone, Copy)]
pub struct EntryStats {
    pub is_directory: bool,
    pub len: u64,
    pub created: Option<SystemTime>,
}

impl From<&Metadata> for EntryStats {
    fn from(metadata: &Metadata) -> Self {
        Self {
            is_directory: metadata.is_dir(),
            len: metadata.len(),
            // Birth time is missing on some filesystems.
            created: metadata.created().or_else(|_| metadata.modified()).ok(),
        }
    }
}

/// Build an entry for `name` located in the client-relative directory `parent`.
pub fn build_entry(stats: EntryStats, name: &str, parent: &str) -> Entry {
    Entry {
        name: name.to_string(),
        path: join_relative(parent, name),
        is_directory: stats.is_directory,
        size: if stats.is_directory { 0 } else { stats.len },
        created_at: format_timestamp(stats.created.unwrap_or(SystemTime::UNIX_EPOCH)),
        entry_type: EntryType::classify(name, stats.is_directory),
    }
}

/// Directories first, then case-insensitive name order.
pub fn listing_order(a: &Entry, b: &Entry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort entries in place into listing order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(listing_order);
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
