//! Root configuration types
//!
//! The persisted list of storage locations and which one is active.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named directory on the host the active root can be switched to.
///
/// The path is operator-supplied and used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub path: PathBuf,
}

impl Location {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Persisted root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootConfiguration {
    /// Ordered; the index is the addressing key.
    pub locations: Vec<Location>,
    pub active_location_index: usize,
}

impl RootConfiguration {
    pub fn with_locations(locations: Vec<Location>) -> Self {
        Self {
            locations,
            active_location_index: 0,
        }
    }

    /// The active location, if the index points at one.
    pub fn active_location(&self) -> Option<&Location> {
        self.locations.get(self.active_location_index)
    }

    /// A copy with every field present in `patch` replaced.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        Self {
            locations: patch
                .locations
                .clone()
                .unwrap_or_else(|| self.locations.clone()),
            active_location_index: patch
                .active_location_index
                .unwrap_or(self.active_location_index),
        }
    }
}

/// Partial update of a [`RootConfiguration`]; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_location_index: Option<usize>,
}

impl ConfigPatch {
    pub fn active_index(index: usize) -> Self {
        Self {
            active_location_index: Some(index),
            ..Self::default()
        }
    }

    pub fn locations(locations: Vec<Location>) -> Self {
        Self {
            locations: Some(locations),
            ..Self::default()
        }
    }
}
