//! Backing stores for Strata persistence
//!
//! This crate provides:
//! - `KeyValueStore`: the string store contract the facade writes envelopes to
//! - `StoreContext`: storage tag and data directory handed to `initialize`
//! - `MemoryStore`: DashMap-based ephemeral store
//! - `FileStore`: checksummed snapshot file with atomic commits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, StoreContext, DEFAULT_STORAGE_TAG};
