//! Key-value persistence for the workdesk collections.
//!
//! Every collection lives under one logical key and is written back whole
//! after each mutation. Loading is tolerant: a missing key yields the
//! default collection, unreadable text is discarded with a warning, and a
//! single malformed record inside an otherwise readable array is dropped
//! without losing its neighbours.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, error, trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{Config, Result, WorkdeskError};

/// Storage key of the project list
pub const PROJECTS_KEY: &str = "projects";
/// Storage key of the per-project timer lists
pub const TIMERS_KEY: &str = "timers";
/// Storage key of the journal days
pub const JOURNAL_KEY: &str = "journalRecords";
/// Storage key of the blog posts
pub const BLOGS_KEY: &str = "blogs";
/// Storage key of the whiteboard items
pub const WHITEBOARD_KEY: &str = "whiteboardItems";

/// A string-keyed text store.
pub trait KeyValueStore {
    /// Reads the text stored under `key`, or `None` when nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the text stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Whether collections should be written as indented JSON
    fn prefers_pretty(&self) -> bool {
        false
    }
}

/// Outcome of reading a collection from a [`KeyValueStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum Stored<T> {
    /// Nothing has been stored under the key yet
    Missing,
    /// Something is stored but could not be read or parsed
    Unreadable,
    /// The parsed collection
    Present(T),
}

impl<T> Stored<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Stored::Present(value) => Some(value),
            Stored::Missing | Stored::Unreadable => None,
        }
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    pretty: bool,
}

impl FileStore {
    /// Opens a file store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            debug!("Data directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                WorkdeskError::DirectoryError { path: dir.clone() }
            })?;
        }

        Ok(Self { dir, pretty: false })
    }

    /// Opens the store configured in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::open(&config.data_dir)?.with_pretty(config.pretty_json))
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Helper method to get the file path for a key
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            trace!("No file for key {} at {}", key, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            WorkdeskError::Io(e)
        })?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Writing key {} to {}", key, path.display());

        // Write next to the target so the final rename stays on one filesystem
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            WorkdeskError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            WorkdeskError::Io(e.error)
        })?;

        Ok(())
    }

    fn prefers_pretty(&self) -> bool {
        self.pretty
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store that already holds `value` under `key`
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn lock_failed() -> WorkdeskError {
        WorkdeskError::LockAcquisitionFailed {
            message: "Failed to acquire lock on memory store".to_string(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| Self::lock_failed())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::lock_failed())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and parses the collection stored under `key`.
pub fn load_collection<T, S>(store: &S, key: &str) -> Stored<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("Nothing stored under {}", key);
            return Stored::Missing;
        }
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return Stored::Unreadable;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Stored::Present(value),
        Err(e) => {
            warn!("Discarding unreadable data under {}: {}", key, e);
            Stored::Unreadable
        }
    }
}

/// Converts raw JSON records one by one, dropping the ones that do not parse.
pub fn decode_records<R>(key: &str, values: Vec<Value>) -> Vec<R>
where
    R: DeserializeOwned,
{
    let total = values.len();
    let records: Vec<R> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping malformed record #{} under {}: {}", index, key, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            "Loaded {} of {} records under {}",
            records.len(),
            total,
            key
        );
    }
    records
}

/// Reads a JSON array under `key` with per-record tolerance
pub fn load_records<R, S>(store: &S, key: &str) -> Stored<Vec<R>>
where
    R: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match load_collection::<Vec<Value>, S>(store, key) {
        Stored::Present(values) => Stored::Present(decode_records(key, values)),
        Stored::Missing => Stored::Missing,
        Stored::Unreadable => Stored::Unreadable,
    }
}

/// Serializes `value` and overwrites whatever is stored under `key`.
pub fn save_collection<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = if store.prefers_pretty() {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    store.set(key, &json)
}

/// A backend whose writes always fail, as a full disk would
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(WorkdeskError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        id: u64,
    }

    #[test]
    fn missing_key_is_reported_as_missing() {
        let store = MemoryStore::new();
        assert_eq!(load_collection::<Vec<u64>, _>(&store, "nothing"), Stored::Missing);
    }

    #[test]
    fn garbage_is_unreadable() {
        let store = MemoryStore::with_entry("projects", "{not json");
        assert_eq!(
            load_collection::<Vec<u64>, _>(&store, "projects"),
            Stored::Unreadable
        );
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let store = MemoryStore::with_entry("items", r#"[{"id":1},{"id":"two"},{"id":3}]"#);
        let records: Vec<Entry> = load_records(&store, "items").into_option().unwrap();
        assert_eq!(records, vec![Entry { id: 1 }, Entry { id: 3 }]);
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let mut first = MemoryStore::new();
        let second = first.clone();
        save_collection(&mut first, "numbers", &vec![1, 2, 3]).unwrap();
        assert_eq!(second.get("numbers").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn file_store_overwrites_whole_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        save_collection(&mut store, "numbers", &vec![1, 2, 3]).unwrap();
        save_collection(&mut store, "numbers", &vec![4]).unwrap();

        assert_eq!(store.get("numbers").unwrap().as_deref(), Some("[4]"));
        assert!(dir.path().join("data").join("numbers.json").exists());
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn pretty_file_store_indents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap().with_pretty(true);
        save_collection(&mut store, "numbers", &vec![1]).unwrap();
        assert_eq!(store.get("numbers").unwrap().as_deref(), Some("[\n  1\n]"));
    }
}
