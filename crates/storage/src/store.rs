//! Backing store contract
//!
//! A [`KeyValueStore`] persists envelope text under string keys. All
//! operations are synchronous and must be committed before they return.
//! Implementations use interior locking so a store can be shared behind an
//! `Arc` and used from several threads at once.

use persist_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Default storage tag when none is configured
pub const DEFAULT_STORAGE_TAG: &str = "Data";

/// Where and under which name a store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    /// Name of the store, used to derive file names
    pub storage_tag: String,
    /// Directory for stores that write to disk
    pub data_dir: Option<PathBuf>,
}

impl StoreContext {
    /// Create a context with the given tag and no data directory
    pub fn new(storage_tag: impl Into<String>) -> Self {
        Self {
            storage_tag: storage_tag.into(),
            data_dir: None,
        }
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Check that the tag can name a file inside `data_dir`
    ///
    /// The tag must be non-empty, must not be `.` or `..`, and must not
    /// contain a path separator or a NUL byte.
    pub fn validate(&self) -> Result<()> {
        let tag = self.storage_tag.as_str();
        if tag.is_empty() {
            return Err(Error::Validation("storage tag is empty".to_string()));
        }
        if tag == "." || tag == ".." || tag.contains(&['/', '\\', '\0'][..]) {
            return Err(Error::Validation(format!(
                "storage tag {:?} is not a plain file name",
                tag
            )));
        }
        Ok(())
    }
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_TAG)
    }
}

/// Persistent string store with an explicit lifecycle
pub trait KeyValueStore: Send + Sync {
    /// Prepare the store for use
    ///
    /// Calling this again on an initialized store is a no-op.
    fn initialize(&self, ctx: &StoreContext) -> Result<()>;

    /// Flush and close. Returns false if nothing was open or the flush failed.
    fn shutdown(&self) -> bool;

    /// Close and release in-memory state without flushing.
    fn terminate(&self) -> bool;

    /// Store `value` under `key`. An empty key is a no-op returning false.
    fn put(&self, key: &str, value: &str) -> bool;

    /// Read the value under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Remove `key`. Returns true if it existed and the removal committed.
    fn delete(&self, key: &str) -> bool;

    /// Remove every key
    fn delete_all(&self) -> bool;

    /// Number of stored keys
    fn count(&self) -> u64;

    /// Check if `key` is stored
    fn contains(&self, key: &str) -> bool;

    /// All stored keys, sorted
    fn keys(&self) -> Vec<String>;

    /// Remove every key starting with `prefix`
    ///
    /// Returns true if every matching key was removed.
    fn delete_keys_with_prefix(&self, prefix: &str) -> bool {
        self.keys()
            .iter()
            .filter(|k| k.starts_with(prefix))
            .fold(true, |ok, k| self.delete(k) && ok)
    }
}
