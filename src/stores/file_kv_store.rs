use super::{KeyValueStore, MemoryKvStore};
use crate::constants::storage::FILE_MODE;
use crate::errors::StoreError;
use crate::utils::fs_atomic::atomic_write_text_file;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key-value store backed by one JSON object file, rewritten atomically on
/// every mutation.
#[derive(Clone)]
pub struct FileKvStore {
    inner: MemoryKvStore,
    file_path: PathBuf,
    queue: Arc<Mutex<()>>,
}

impl FileKvStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: MemoryKvStore::new(),
            file_path: file_path.into(),
            queue: Arc::new(Mutex::new(())),
        }
    }

    /// Opens `file_path`, loading existing entries. A missing file is an empty store.
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(file_path);
        store.load_from_disk()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn load_from_disk(&self) -> Result<(), StoreError> {
        if !self.file_path.exists() {
            return Ok(());
        }
        let raw = std::fs::read_to_string(&self.file_path)?;
        if raw.trim().is_empty() {
            return Ok(());
        }
        let parsed: Value = serde_json::from_str(&raw)?;
        let Value::Object(map) = parsed else {
            return Err(StoreError::NotAnObject {
                path: self.file_path.display().to_string(),
            });
        };
        let entries: HashMap<String, String> = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                Value::Null => None,
                other => Some((key, other.to_string())),
            })
            .collect();
        self.inner.load(entries);
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.queue.lock().unwrap_or_else(|err| err.into_inner());
        let sorted: BTreeMap<String, String> = self.inner.snapshot().into_iter().collect();
        let payload = serde_json::to_string_pretty(&sorted)?;
        atomic_write_text_file(&self.file_path, &format!("{}\n", payload), FILE_MODE)?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)?;
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.inner.get(key)?.is_none() {
            return Ok(());
        }
        self.inner.remove(key)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::FileKvStore;
    use crate::errors::StoreError;
    use crate::stores::KeyValueStore;
    use std::path::PathBuf;

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("geoquiz-kv-{}-{}-{}", tag, std::process::id(), rand::random::<u32>()))
            .join("state.json")
    }

    #[test]
    fn entries_survive_reopen() {
        let path = temp_file("reopen");
        let store = FileKvStore::open(&path).unwrap();
        store.set("geoquiz-progress", "{\"version\":1}").unwrap();
        store.set("geoquiz-session", "{}").unwrap();
        store.remove("geoquiz-session").unwrap();

        let reopened = FileKvStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("geoquiz-progress").unwrap().as_deref(),
            Some("{\"version\":1}")
        );
        assert!(reopened.get("geoquiz-session").unwrap().is_none());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_opens_empty() {
        let path = temp_file("missing");
        let store = FileKvStore::open(&path).unwrap();
        assert!(store.get("geoquiz-progress").unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn non_object_file_is_rejected() {
        let path = temp_file("array");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = FileKvStore::open(&path).err().expect("array rejected");
        assert!(matches!(err, StoreError::NotAnObject { .. }));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
