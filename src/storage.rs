//! Key-value persistence for notes and preferences.
//!
//! # Backends
//!
//! - [`FileStore`]: one TOML file per key, read and written with `confy`,
//!   under the user's config directory by default.
//! - [`MemoryStore`]: values kept in memory as TOML values; used by tests and
//!   by callers that persist elsewhere.
//!
//! Failures come back as [`StorageError`]. Callers decide how to degrade;
//! see [`load_or_default`].

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Why a load or save failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("config file error: {0}")]
    Confy(#[from] confy::ConfyError),
    #[error("failed to encode value: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to decode value: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A value that can go through a [`Storage`] backend.
///
/// Stored values must serialize to a TOML table, i.e. be a struct or map.
pub trait Storable: Serialize + DeserializeOwned + Default {}

impl<T: Serialize + DeserializeOwned + Default> Storable for T {}

/// Key-value storage collaborator.
pub trait Storage {
    /// Load the value under `key`, or `default` if nothing is stored yet.
    fn load<T: Storable>(&self, key: &str, default: T) -> Result<T, StorageError>;

    /// Store `value` under `key`.
    fn save<T: Storable>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

/// Load `key`, logging and falling back to `default` on failure.
pub fn load_or_default<S: Storage, T: Storable + Clone>(storage: &S, key: &str, default: T) -> T {
    match storage.load(key, default.clone()) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "failed to load, using defaults: {err}");
            default
        }
    }
}

/// TOML files on disk, one per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store files under the platform config directory for `app`.
    pub fn for_app(app: &str) -> Result<Self, StorageError> {
        let base = dirs::config_dir()
            .ok_or_else(|| StorageError::Unavailable("no config directory".to_string()))?;
        Ok(Self::new(base.join(app)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.toml"))
    }
}

impl Storage for FileStore {
    fn load<T: Storable>(&self, key: &str, default: T) -> Result<T, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(default);
        }
        Ok(confy::load_path(path)?)
    }

    fn save<T: Storable>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        confy::store_path(self.path(key), value)?;
        Ok(())
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<AHashMap<String, toml::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }
}

impl Storage for MemoryStore {
    fn load<T: Storable>(&self, key: &str, default: T) -> Result<T, StorageError> {
        match self.values.lock().get(key) {
            Some(value) => Ok(value.clone().try_into()?),
            None => Ok(default),
        }
    }

    fn save<T: Storable>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = toml::Value::try_from(value)?;
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
        tags: Vec<String>,
    }

    fn sample() -> Sample {
        Sample {
            name: "groceries".to_string(),
            count: 3,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    struct BrokenStore;

    impl Storage for BrokenStore {
        fn load<T: Storable>(&self, _key: &str, _default: T) -> Result<T, StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn save<T: Storable>(&self, _key: &str, _value: &T) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_memory_store_default_then_saved_value() {
        let store = MemoryStore::new();
        assert_eq!(store.load("sample", Sample::default()).unwrap(), Sample::default());
        assert!(!store.contains("sample"));

        store.save("sample", &sample()).unwrap();
        assert!(store.contains("sample"));
        assert_eq!(store.load("sample", Sample::default()).unwrap(), sample());
    }

    #[test]
    fn test_file_store_default_then_saved_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.load("sample", sample()).unwrap(), sample());

        let mut changed = sample();
        changed.count = 9;
        store.save("sample", &changed).unwrap();
        assert!(dir.path().join("nested").join("sample.toml").exists());
        assert_eq!(store.load("sample", Sample::default()).unwrap(), changed);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample.toml"), "name = [unterminated").unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load("sample", Sample::default()).is_err());
        assert_eq!(load_or_default(&store, "sample", sample()), sample());
    }

    #[test]
    fn test_for_app_lives_under_config_dir() {
        match (FileStore::for_app("noteassist"), dirs::config_dir()) {
            (Ok(store), Some(base)) => {
                assert_eq!(store.root(), base.join("noteassist"));
                assert_eq!(store.path("notes"), base.join("noteassist").join("notes.toml"));
            }
            (Err(StorageError::Unavailable(_)), None) => {}
            (result, base) => panic!("unexpected store {result:?} for config dir {base:?}"),
        }
    }

    #[test]
    fn test_load_or_default_on_failure() {
        assert_eq!(load_or_default(&BrokenStore, "sample", sample()), sample());
    }
}
