//! Root configuration store
//!
//! Loads the persisted [`RootConfiguration`] once, caches it for the life of
//! the process and rewrites the whole document on every change.

use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::ConfigStoreError;
use crate::locations::types::{ConfigPatch, Location, RootConfiguration};

/// Owner of the active-root selection. Constructed once by the entry point
/// and shared by reference with everything that resolves paths.
#[derive(Debug)]
pub struct LocationStore {
    config_path: PathBuf,
    defaults: Vec<Location>,
    fallback_root: PathBuf,
    cache: RwLock<Option<RootConfiguration>>,
}

impl LocationStore {
    /// Store persisted at `config_path`, with built-in locations derived from
    /// `default_root` for when nothing has been persisted yet.
    pub fn new(config_path: impl Into<PathBuf>, default_root: impl AsRef<Path>) -> Self {
        let defaults = default_locations(default_root.as_ref());
        let fallback_root = defaults
            .first()
            .map(|location| location.path.clone())
            .unwrap_or_else(|| default_root.as_ref().to_path_buf());
        Self::build(config_path.into(), defaults, fallback_root)
    }

    /// Store with an explicit default location list.
    ///
    /// The first default is the fallback root, so an empty list is refused.
    pub fn with_defaults(
        config_path: impl Into<PathBuf>,
        defaults: Vec<Location>,
    ) -> Result<Self, ConfigStoreError> {
        let fallback_root = match defaults.first() {
            Some(location) => location.path.clone(),
            None => return Err(ConfigStoreError::NoLocations),
        };
        Ok(Self::build(config_path.into(), defaults, fallback_root))
    }

    fn build(config_path: PathBuf, defaults: Vec<Location>, fallback_root: PathBuf) -> Self {
        Self {
            config_path,
            defaults,
            fallback_root,
            cache: RwLock::new(None),
        }
    }

    /// Returns the cached configuration, reading it from disk on first use.
    ///
    /// Never fails: an unreadable or corrupt document is logged and replaced
    /// by the defaults. A missing document is created from the defaults.
    pub async fn load(&self) -> RootConfiguration {
        if let Some(config) = self.cache.read().await.as_ref() {
            return config.clone();
        }

        let mut cache = self.cache.write().await;
        if let Some(config) = cache.as_ref() {
            return config.clone();
        }

        let config = self.read_persisted().await;
        *cache = Some(config.clone());
        config
    }

    /// Merges `patch` into the configuration, persists the result and caches it.
    ///
    /// The cache only changes after the write succeeded.
    pub async fn save(&self, patch: ConfigPatch) -> Result<RootConfiguration, ConfigStoreError> {
        let current = self.load().await;
        let mut cache = self.cache.write().await;
        let base = cache.clone().unwrap_or(current);
        let merged = base.merged(&patch);

        self.persist(&merged).await?;
        *cache = Some(merged.clone());

        info!(
            "Saved root configuration: {} locations, active index {}",
            merged.locations.len(),
            merged.active_location_index
        );

        Ok(merged)
    }

    /// Absolute path of the active location.
    ///
    /// Falls back to the first default location when the active index does
    /// not point at a configured location.
    pub async fn active_root_path(&self) -> PathBuf {
        let config = self.load().await;
        match config.active_location() {
            Some(location) => location.path.clone(),
            None => {
                warn!(
                    "Active location index {} out of range ({} locations), using default",
                    config.active_location_index,
                    config.locations.len()
                );
                self.fallback_root.clone()
            }
        }
    }

    fn default_config(&self) -> RootConfiguration {
        RootConfiguration::with_locations(self.defaults.clone())
    }

    async fn read_persisted(&self) -> RootConfiguration {
        let path = &self.config_path;
        match fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str::<RootConfiguration>(&contents) {
                Ok(config) => {
                    debug!(
                        "Loaded root configuration with {} locations from {}",
                        config.locations.len(),
                        path.display()
                    );
                    config
                }
                Err(e) => {
                    warn!("Failed to parse root configuration {}: {}", path.display(), e);
                    self.default_config()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No root configuration at {}, creating defaults", path.display());
                let config = self.default_config();
                if let Err(e) = self.persist(&config).await {
                    warn!("{}", e);
                }
                config
            }
            Err(e) => {
                warn!("Failed to read root configuration {}: {}", path.display(), e);
                self.default_config()
            }
        }
    }

    /// Writes the whole document to a sibling temp file, then renames it into place.
    async fn persist(&self, config: &RootConfiguration) -> Result<(), ConfigStoreError> {
        let json = serde_json::to_string_pretty(config)?;
        let path = &self.config_path;
        let persistence = |source: std::io::Error| ConfigStoreError::Persistence {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(persistence)?;
        }

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, json).await.map_err(persistence)?;
        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(persistence(e));
        }
        Ok(())
    }
}

/// Built-in locations: the configured default root and a sibling `uploads`.
pub fn default_locations(default_root: &Path) -> Vec<Location> {
    let storage = std::path::absolute(default_root).unwrap_or_else(|_| default_root.to_path_buf());
    let uploads = storage.with_file_name("uploads");
    vec![Location::new("Storage", storage), Location::new("Uploads", uploads)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LocationStore {
        LocationStore::with_defaults(
            dir.path().join("fm-config.json"),
            vec![
                Location::new("Storage", dir.path().join("storage")),
                Location::new("Uploads", dir.path().join("uploads")),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn first_load_persists_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let config = store.load().await;
        assert_eq!(config.locations.len(), 2);
        assert_eq!(config.active_location_index, 0);

        let on_disk: RootConfiguration = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("fm-config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(on_disk, config);
    }

    #[tokio::test]
    async fn corrupt_document_falls_back_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fm-config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = store_in(&dir);
        let config = store.load().await;
        assert_eq!(config.locations[0].name, "Storage");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn save_round_trips_through_a_fresh_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let merged = store.save(ConfigPatch::active_index(1)).await.unwrap();
        assert_eq!(merged.active_location_index, 1);
        assert_eq!(store.active_root_path().await, dir.path().join("uploads"));

        let restarted = store_in(&dir);
        assert_eq!(restarted.load().await, merged);
        assert!(!dir.path().join("fm-config.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_write_leaves_cache_unchanged() {
        let dir = TempDir::new().unwrap();
        // The config path's parent is a regular file, so every write fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = LocationStore::with_defaults(
            blocker.join("fm-config.json"),
            vec![
                Location::new("A", dir.path().join("a")),
                Location::new("B", dir.path().join("b")),
            ],
        )
        .unwrap();

        let before = store.load().await;
        let result = store.save(ConfigPatch::active_index(1)).await;
        assert!(matches!(result, Err(ConfigStoreError::Persistence { .. })));
        assert_eq!(store.load().await, before);
    }

    #[tokio::test]
    async fn out_of_range_index_falls_back_to_first_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(ConfigPatch::active_index(7)).await.unwrap();
        assert_eq!(store.active_root_path().await, dir.path().join("storage"));
    }

    #[test]
    fn empty_defaults_are_refused() {
        let dir = TempDir::new().unwrap();
        let result = LocationStore::with_defaults(dir.path().join("fm-config.json"), Vec::new());
        assert!(matches!(result, Err(ConfigStoreError::NoLocations)));
    }

    #[tokio::test]
    async fn emptied_location_list_falls_back_to_first_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(ConfigPatch::locations(Vec::new())).await.unwrap();
        assert_eq!(store.active_root_path().await, dir.path().join("storage"));
    }

    #[test]
    fn default_locations_are_absolute_siblings() {
        let locations = default_locations(Path::new("data/storage"));
        assert!(locations[0].path.is_absolute());
        assert_eq!(locations[0].path.parent(), locations[1].path.parent());
        assert!(locations[1].path.ends_with("uploads"));
    }
}
