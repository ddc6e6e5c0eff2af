mod file_kv_store;
mod memory_kv_store;

pub use file_kv_store::FileKvStore;
pub use memory_kv_store::MemoryKvStore;

use crate::errors::StoreError;

/// String-keyed, string-valued storage behind the persistence adapter.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
