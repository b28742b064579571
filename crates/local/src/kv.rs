//! String key → string value stores.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

/// Prefix applied to every key written by this crate.
pub const KEY_PREFIX: &str = "stockarium_";

/// Namespaced key for `name`.
pub fn key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize stored value: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage quota exceeded ({limit} bytes)")]
    QuotaExceeded { limit: usize },

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("failed to determine platform data directory")]
    NoDataDir,
}

/// Minimal key-value contract.
///
/// `set_many` is all-or-nothing: after it returns, either every entry was
/// written or none was.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(vec![(key.to_string(), value)])
    }
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store for tests/dev. Clones share the same entries.
///
/// An optional quota (total bytes of keys + values) mimics browser storage
/// limits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            inner: Arc::default(),
            quota: Some(limit),
        }
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let map = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;

        if let Some(limit) = self.quota {
            let mut projected = map.clone();
            projected.extend(entries.iter().cloned());
            let used: usize = projected.iter().map(|(k, v)| k.len() + v.len()).sum();
            if used > limit {
                return Err(StorageError::QuotaExceeded { limit });
            }
        }

        map.extend(entries);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// File-backed store: all entries live in one JSON document.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// document, so readers never observe a half-written batch. Concurrent
/// writers in other processes are not coordinated; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store at `<data_dir>/stockarium/store.json`, creating the directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?.join("stockarium");
        Self::open_in(&dir)
    }

    /// Store at `<dir>/store.json`, creating `dir` if needed.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self::new(dir.join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            path: tmp.clone(),
            source,
        };

        let body = serde_json::to_vec_pretty(map)?;
        let mut file = std::fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&body).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_all()?;
        map.extend(entries);
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stockarium-kv-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn in_memory_clones_share_entries() {
        let a = InMemoryKeyValueStore::new();
        let b = a.clone();
        a.set("k", "v".to_string()).unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        b.remove("k").unwrap();
        assert_eq!(a.get("k").unwrap(), None);
    }

    #[test]
    fn quota_rejects_whole_batch() {
        let store = InMemoryKeyValueStore::with_quota(10);
        store.set("a", "1234".to_string()).unwrap();

        let err = store
            .set_many(vec![
                ("b".to_string(), "1".to_string()),
                ("c".to_string(), "123456789".to_string()),
            ])
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 10 }));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn poisoned_lock_is_reported_by_every_accessor() {
        let store = InMemoryKeyValueStore::new();
        store.set("a", "1".to_string()).unwrap();

        let inner = Arc::clone(&store.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.keys(), Err(StorageError::Poisoned)));
        assert!(matches!(store.get("a"), Err(StorageError::Poisoned)));
        assert!(matches!(store.set("b", "2".to_string()), Err(StorageError::Poisoned)));
    }

    #[test]
    fn unusable_data_directory_is_an_io_error() {
        let dir = temp_dir();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = FileKeyValueStore::open_in(&blocker.join("nested")).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }), "{err}");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn file_store_persists_across_handles() {
        let dir = temp_dir();
        let store = FileKeyValueStore::open_in(&dir).unwrap();
        store
            .set_many(vec![
                (key("products"), "[]".to_string()),
                (key("alerts"), "[]".to_string()),
            ])
            .unwrap();

        let reopened = FileKeyValueStore::new(dir.join("store.json"));
        assert_eq!(reopened.get(&key("products")).unwrap().as_deref(), Some("[]"));
        reopened.remove(&key("products")).unwrap();
        assert_eq!(store.get(&key("products")).unwrap(), None);
        assert_eq!(store.get(&key("alerts")).unwrap().as_deref(), Some("[]"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = temp_dir();
        let store = FileKeyValueStore::new(dir.join("absent.json"));
        assert_eq!(store.get("anything").unwrap(), None);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = temp_dir();
        let path = dir.join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileKeyValueStore::new(&path).get("k").unwrap_err();
        assert!(matches!(err, StorageError::Serde(_)));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
