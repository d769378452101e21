//*** START FILE: src/store/mod.rs ***//
//! Key-value persistence for corpus text and annotation progress.
//!
//! The annotator keeps three logical keys, mirroring what a browser build
//! would keep in local storage. Values are plain strings; encoding lives in
//! [`progress_io`].

pub mod progress_io;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Raw corpus CSV text, byte for byte as imported
pub const CORPUS_KEY: &str = "translationCSV";
/// JSON list of completed sentence ids
pub const COMPLETED_KEY: &str = "completedAnnotations";
/// JSON list of submitted sessions
pub const ANNOTATIONS_KEY: &str = "allAnnotations";

/// Synchronous string store. Each call either fully succeeds or leaves the
/// previously stored value in place.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as a file under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the store directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| Error::persistence(root.display().to_string(), e))?;
        Ok(FileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::persistence(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.tmp", key));
        // rename keeps the old value intact if the write fails halfway
        fs::write(&tmp, value).map_err(|e| Error::persistence(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::persistence(key, e)
        })?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::persistence(key, e)),
        }
    }
}

/// In-memory store with an optional total size limit.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the stored values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        MemoryStore {
            values: HashMap::new(),
            quota_bytes: Some(bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.values.values().map(String::len).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.values.get(key).map_or(0, String::len);
            let projected = self.used_bytes() - replaced + value.len();
            if projected > quota {
                return Err(Error::persistence(
                    key,
                    format!("quota exceeded ({} > {} bytes)", projected, quota),
                ));
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get(CORPUS_KEY).unwrap(), None);
        store.set(CORPUS_KEY, "id,source,t\n1,a,b\n").unwrap();
        assert_eq!(store.get(CORPUS_KEY).unwrap().as_deref(), Some("id,source,t\n1,a,b\n"));

        store.remove(CORPUS_KEY).unwrap();
        assert_eq!(store.get(CORPUS_KEY).unwrap(), None);
        // removing twice is fine
        store.remove(CORPUS_KEY).unwrap();
    }

    #[test]
    fn memory_store_quota_keeps_previous_value() {
        let mut store = MemoryStore::with_quota(8);
        store.set("k", "1234").unwrap();
        let err = store.set("k", "123456789").unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1234"));
        // replacing a value only counts the difference
        store.set("k", "12345678").unwrap();
    }
}
//*** END FILE: src/store/mod.rs ***//
