//! In-memory store
//!
//! DashMap-backed: lock-free reads, sharded writes. Nothing survives the
//! process; lifecycle calls always succeed.

use crate::store::{KeyValueStore, StoreContext};
use dashmap::DashMap;
use persist_core::Result;
use tracing::debug;

/// Ephemeral key-value store
///
/// # Example
///
/// ```ignore
/// use persist_storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.put("k", "v");
/// assert_eq!(store.get("k").as_deref(), Some("v"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with expected number of keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn initialize(&self, ctx: &StoreContext) -> Result<()> {
        debug!(storage_tag = %ctx.storage_tag, "memory store ready");
        Ok(())
    }

    fn shutdown(&self) -> bool {
        true
    }

    fn terminate(&self) -> bool {
        self.entries.clear();
        true
    }

    #[inline]
    fn put(&self, key: &str, value: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn delete_all(&self) -> bool {
        self.entries.clear();
        true
    }

    fn count(&self) -> u64 {
        self.entries.len() as u64
    }

    #[inline]
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    fn delete_keys_with_prefix(&self, prefix: &str) -> bool {
        self.entries.retain(|k, _| !k.starts_with(prefix));
        true
    }
}
