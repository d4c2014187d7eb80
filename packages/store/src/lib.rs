#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File-backed JSON map stores for the location pipeline.
//!
//! Every pipeline stage reads and rewrites one of two persisted maps:
//! the standardization store (`raw → canonical-or-FAILED`) and the
//! geocoded store (`canonical → coordinates + variants`). Both are plain
//! JSON objects on disk, flushed with a full rewrite after every
//! mutation so an interrupted run loses at most the in-flight item.
//!
//! Insertion order is preserved ([`indexmap`]) because downstream passes
//! and the human-readable mirrors depend on first-seen ordering.

pub mod mirror;
pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from persisted store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read/write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file contents are not valid JSON for the expected shape.
    #[error("malformed store file {}: {source}", path.display())]
    Malformed {
        /// The offending file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An insertion-ordered `String → V` map persisted as a JSON object.
///
/// [`MapStore::flush`] rewrites the whole file through a temp-and-rename
/// so a crash mid-write never leaves a partial record on disk.
#[derive(Debug)]
pub struct MapStore<V> {
    path: PathBuf,
    entries: IndexMap<String, V>,
}

impl<V: Serialize + DeserializeOwned> MapStore<V> {
    /// Opens the store at `path`, resuming from existing contents.
    ///
    /// A missing file yields an empty store. An unreadable or malformed
    /// file is logged and also yields an empty store, matching the
    /// resume semantics: a damaged output file means starting fresh,
    /// not aborting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            return Ok(Self {
                path,
                entries: IndexMap::new(),
            });
        }

        let contents = fs::read_to_string(&path)?;
        let entries = match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "Could not read existing store {}: {e}; starting fresh",
                    path.display()
                );
                IndexMap::new()
            }
        };

        Ok(Self { path, entries })
    }

    /// Opens the store at `path`, failing loudly if it is missing or
    /// malformed. Used for stores that are required inputs to a stage.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file is missing or unreadable,
    /// or [`StoreError::Malformed`] if it is not a valid JSON map.
    pub fn load_required(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, entries })
    }

    /// Creates an empty store bound to `path` without reading the disk.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: IndexMap::new(),
        }
    }

    /// Rewrites the entire store file.
    ///
    /// Writes to a sibling temp file and renames it into place, so the
    /// store on disk is always a complete JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            paths::ensure_dir(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Writes a full snapshot of the current entries to `backup_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub fn snapshot_to(&self, backup_path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = backup_path.parent() {
            paths::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(backup_path, json)?;
        Ok(())
    }

    /// The file this store is bound to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts or replaces an entry. Does not flush.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    /// Replaces the entire contents with `entries`, preserving their
    /// order. Does not flush.
    pub fn replace_all(&mut self, entries: IndexMap<String, V>) {
        self.entries = entries;
    }

    /// Borrows the underlying ordered map.
    #[must_use]
    pub const fn entries(&self) -> &IndexMap<String, V> {
        &self.entries
    }
}

impl<'a, V> IntoIterator for &'a MapStore<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = indexmap::map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use talent_map_location_models::Standardization;

    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("standardized_locations.json")
    }

    #[test]
    fn load_missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store: MapStore<Standardization> = MapStore::load(store_path(&dir)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn flush_then_load_round_trips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        store.insert(
            "NYC",
            Standardization::Canonical("New York, New York, United States".to_string()),
        );
        store.insert("Remote", Standardization::Failed);
        store.insert(
            "Berlin",
            Standardization::Canonical("Berlin, Germany".to_string()),
        );
        store.flush().unwrap();

        let reloaded: MapStore<Standardization> = MapStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        let keys: Vec<&String> = reloaded.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["NYC", "Remote", "Berlin"]);
        assert_eq!(reloaded.get("Remote"), Some(&Standardization::Failed));
    }

    #[test]
    fn malformed_store_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "{ not json").unwrap();

        let store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_required_rejects_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        assert!(MapStore::<Standardization>::load_required(&path).is_err());

        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = MapStore::<Standardization>::load_required(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn snapshot_writes_independent_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        let backup = dir.path().join("standardized_locations_backup.json");

        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        store.insert("Oslo", Standardization::Canonical("Oslo, Norway".to_string()));
        store.snapshot_to(&backup).unwrap();

        store.insert("Lima", Standardization::Failed);
        store.flush().unwrap();

        let snap: MapStore<Standardization> = MapStore::load(&backup).unwrap();
        assert_eq!(snap.len(), 1);
        assert!(snap.contains_key("Oslo"));
    }
}
