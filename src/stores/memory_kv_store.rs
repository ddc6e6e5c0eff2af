use super::KeyValueStore;
use crate::errors::StoreError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub(crate) fn load(&self, entries: HashMap<String, String>) {
        if let Ok(mut guard) = self.entries.write() {
            *guard = entries;
        }
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|err| err.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|err| err.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::stores::KeyValueStore;

    #[test]
    fn last_write_wins_and_remove_is_quiet() {
        let store = MemoryKvStore::new();
        store.set("geoquiz-progress", "a").unwrap();
        store.set("geoquiz-progress", "b").unwrap();
        assert_eq!(store.get("geoquiz-progress").unwrap().as_deref(), Some("b"));
        store.remove("geoquiz-progress").unwrap();
        store.remove("geoquiz-progress").unwrap();
        assert!(store.get("geoquiz-progress").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryKvStore::new();
        let view = store.clone();
        store.set("geoquiz-session", "{}").unwrap();
        assert_eq!(view.keys(), vec!["geoquiz-session"]);
    }
}
