//! Best-effort JSON persistence over a flat key-value space.
//!
//! [`KeyValueStore`] is the raw layer and reports every failure.
//! [`LocalStore`] sits on top of it, encodes values as JSON and turns every
//! failure into a log line plus a fallback value, so persistence never
//! interrupts a search.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

pub const HISTORY_KEY: &str = "weather_app_history";
pub const SETTINGS_KEY: &str = "weather_app_settings";
pub const LAST_CITY_KEY: &str = "weather_app_last_city";

/// Raw text storage addressed by key. Writes to one key are atomic.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keeps values in memory only; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io { key: key.to_string(), source }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        // Write beside the target, then rename over it.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

/// JSON-encoding wrapper that never propagates storage failures.
#[derive(Debug, Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(dir)))
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            tracing::warn!(key, error = %e, "failed to save to local store");
        }
    }

    /// Returns `default` when the key is missing or its contents cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to load from local store");
                default
            }
        }
    }

    pub fn clear(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "failed to clear local store key");
        }
    }

    fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)
            .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
        self.backend.set(key, &encoded)
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode { key: key.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<i32>,
        nested: Option<Box<Sample>>,
    }

    /// Fails every operation, like a full or read-only disk.
    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(io_error(key, std::io::Error::other("disk on fire")))
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(io_error(key, std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            Err(io_error(key, std::io::Error::other("read-only")))
        }
    }

    fn sample() -> Sample {
        Sample {
            name: "outer".into(),
            values: vec![1, -2, 3],
            nested: Some(Box::new(Sample { name: "inner".into(), values: vec![], nested: None })),
        }
    }

    #[test]
    fn memory_save_then_load_returns_equal_value() {
        let store = LocalStore::in_memory();
        store.save("sample", &sample());
        assert_eq!(store.load::<Option<Sample>>("sample", None), Some(sample()));
    }

    #[test]
    fn save_then_load_arbitrary_json() {
        let store = LocalStore::in_memory();
        let value = json!({"a": [1, 2.5, null, "x"], "b": {"c": true}});
        store.save("blob", &value);
        assert_eq!(store.load("blob", serde_json::Value::Null), value);
    }

    #[test]
    fn load_missing_key_returns_default() {
        let store = LocalStore::in_memory();
        assert_eq!(store.load("nothing", 42), 42);
    }

    #[test]
    fn load_undecodable_value_returns_default() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("bad", "{not json").unwrap();
        let store = LocalStore::new(backend);
        assert_eq!(store.load("bad", vec![7]), vec![7]);
    }

    #[test]
    fn load_wrong_shape_returns_default() {
        let store = LocalStore::in_memory();
        store.save("city", "Berlin");
        assert_eq!(store.load::<Vec<u32>>("city", Vec::new()), Vec::<u32>::new());
    }

    #[test]
    fn clear_removes_key() {
        let store = LocalStore::in_memory();
        store.save("city", "Berlin");
        store.clear("city");
        assert_eq!(store.load("city", String::from("none")), "none");
        // Clearing twice is fine.
        store.clear("city");
    }

    #[test]
    fn broken_backend_is_swallowed() {
        let store = LocalStore::new(Arc::new(BrokenStore));
        store.save("k", &1);
        store.clear("k");
        assert_eq!(store.load("k", 5), 5);
    }

    #[test]
    fn file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::on_disk(dir.path().join("nested"));

        store.save(SETTINGS_KEY, &json!({"unit": "imperial"}));
        assert!(dir.path().join("nested").join("weather_app_settings.json").exists());
        assert_eq!(
            store.load(SETTINGS_KEY, serde_json::Value::Null),
            json!({"unit": "imperial"})
        );

        store.clear(SETTINGS_KEY);
        assert!(!dir.path().join("nested").join("weather_app_settings.json").exists());
        assert_eq!(store.load(SETTINGS_KEY, serde_json::Value::Null), serde_json::Value::Null);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        LocalStore::on_disk(dir.path()).save(LAST_CITY_KEY, "Lisbon");
        let reopened = LocalStore::on_disk(dir.path());
        assert_eq!(reopened.load(LAST_CITY_KEY, String::new()), "Lisbon");
    }

    #[test]
    fn file_store_overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert!(!dir.path().join("k.json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for key in ["", "../escape", "a/b", "dot.key"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {key:?}");
        }
    }
}
