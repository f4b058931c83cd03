//! Snapshot file store
//!
//! Keeps every entry in memory and mirrors the whole map to
//! `<data_dir>/<storage_tag>.json` on each mutation.
//!
//! ## Commit protocol
//!
//! | Step | Action |
//! |------|--------|
//! | 1 | Apply the mutation to a copy of the entries |
//! | 2 | Write the copy with its CRC32 to `<tag>.json.tmp` |
//! | 3 | fsync the temp file |
//! | 4 | Rename over `<tag>.json` |
//! | 5 | Swap the copy in as the live entries |
//!
//! A failure in steps 2-4 leaves both the file and the live entries as they
//! were, and the operation returns false.
//!
//! Every mutation copies and rewrites the whole map, so a write costs
//! O(n) in the number of stored entries. This store suits settings-sized
//! data; large or write-heavy stores should supply their own
//! [`KeyValueStore`].
//!
//! The storage tag must be a plain file name; see [`StoreContext::validate`].

use crate::store::{KeyValueStore, StoreContext};
use parking_lot::RwLock;
use persist_core::{decode_text, encode_text, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    checksum: u32,
    entries: BTreeMap<String, String>,
}

fn checksum(entries: &BTreeMap<String, String>) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for (key, value) in entries {
        hasher.update(key.as_bytes());
        hasher.update(&[0]);
        hasher.update(value.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

fn load(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = fs::read_to_string(path)?;
    let snapshot: Snapshot = decode_text(&text).map_err(|e| {
        Error::Storage(format!("malformed snapshot {}: {}", path.display(), e))
    })?;
    let actual = checksum(&snapshot.entries);
    if actual != snapshot.checksum {
        return Err(Error::Storage(format!(
            "snapshot {} checksum mismatch: stored {:08x}, computed {:08x}",
            path.display(),
            snapshot.checksum,
            actual
        )));
    }
    Ok(snapshot.entries)
}

fn write_snapshot(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let snapshot = Snapshot {
        checksum: checksum(entries),
        entries: entries.clone(),
    };
    let text = encode_text(&snapshot)?;

    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[derive(Debug, Default)]
struct State {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

/// Disk-backed key-value store
///
/// Requires a `data_dir` in the [`StoreContext`].
#[derive(Debug, Default)]
pub struct FileStore {
    state: RwLock<State>,
}

impl FileStore {
    /// Create a closed store; call [`KeyValueStore::initialize`] to open it
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the snapshot file, if open
    pub fn path(&self) -> Option<PathBuf> {
        self.state.read().path.clone()
    }

    /// Check if the store is open
    pub fn is_open(&self) -> bool {
        self.state.read().path.is_some()
    }

    fn commit<R>(
        &self,
        op: &'static str,
        mutate: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Option<R> {
        let mut state = self.state.write();
        let path = match state.path.clone() {
            Some(path) => path,
            None => {
                warn!(op, "file store is not open");
                return None;
            }
        };

        let mut next = state.entries.clone();
        let out = mutate(&mut next);
        match write_snapshot(&path, &next) {
            Ok(()) => {
                state.entries = next;
                Some(out)
            }
            Err(e) => {
                error!(op, path = %path.display(), error = %e, "snapshot commit failed");
                None
            }
        }
    }

    fn read<R>(&self, op: &'static str, f: impl FnOnce(&BTreeMap<String, String>) -> R) -> Option<R> {
        let state = self.state.read();
        if state.path.is_none() {
            warn!(op, "file store is not open");
            return None;
        }
        Some(f(&state.entries))
    }
}

impl KeyValueStore for FileStore {
    fn initialize(&self, ctx: &StoreContext) -> Result<()> {
        let mut state = self.state.write();
        if state.path.is_some() {
            return Ok(());
        }

        ctx.validate()?;
        let dir = ctx.data_dir.as_ref().ok_or_else(|| {
            Error::Validation("file store requires a data directory".to_string())
        })?;
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}.json", ctx.storage_tag));
        let entries = load(&path)?;
        info!(path = %path.display(), entries = entries.len(), "file store opened");

        state.entries = entries;
        state.path = Some(path);
        Ok(())
    }

    fn shutdown(&self) -> bool {
        let mut state = self.state.write();
        let path = match state.path.take() {
            Some(path) => path,
            None => return false,
        };
        match write_snapshot(&path, &state.entries) {
            Ok(()) => {
                info!(path = %path.display(), "file store closed");
                state.entries.clear();
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "final flush failed");
                state.entries.clear();
                false
            }
        }
    }

    fn terminate(&self) -> bool {
        let mut state = self.state.write();
        let was_open = state.path.take().is_some();
        state.entries.clear();
        was_open
    }

    fn put(&self, key: &str, value: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.commit("put", |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .is_some()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.read("get", |entries| entries.get(key).cloned()).flatten()
    }

    fn delete(&self, key: &str) -> bool {
        let existed = self
            .read("delete", |entries| entries.contains_key(key))
            .unwrap_or(false);
        if !existed {
            return false;
        }
        self.commit("delete", |entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    fn delete_all(&self) -> bool {
        self.commit("delete_all", |entries| entries.clear()).is_some()
    }

    fn count(&self) -> u64 {
        self.read("count", |entries| entries.len() as u64)
            .unwrap_or(0)
    }

    fn contains(&self, key: &str) -> bool {
        self.read("contains", |entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    fn keys(&self) -> Vec<String> {
        self.read("keys", |entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn delete_keys_with_prefix(&self, prefix: &str) -> bool {
        self.commit("delete_keys_with_prefix", |entries| {
            entries.retain(|k, _| !k.starts_with(prefix));
        })
        .is_some()
    }
}
