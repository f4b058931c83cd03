//! Main entry point for Strata persistence.
//!
//! This module provides [`PersistenceBuilder`] for configuration and
//! [`Data`], the lifecycle-gated handle every data operation goes through.

use crate::encryption::{Encryption, NoEncryption, ReverseEncryption};
use crate::error::{Error, Result};
use crate::facade::DefaultFacade;
use crate::partition::{self, Partitioned};
use parking_lot::Mutex;
use persist_core::{Decoded, Element, Persist, TypeRegistry};
use persist_storage::{FileStore, KeyValueStore, MemoryStore, StoreContext, DEFAULT_STORAGE_TAG};
use persist_wire::PayloadCodec;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Typed persistence handle.
///
/// Data operations are refused with [`Error::NotBuilt`] until
/// [`Data::initialize`] has completed once. After that the handle stays
/// built for the rest of its life. A store closed by [`Data::shutdown`] or
/// [`Data::terminate`] is reopened by calling `initialize` again.
///
/// # Example
///
/// ```ignore
/// use strata_persist::prelude::*;
///
/// let builder = PersistenceBuilder::new().storage_tag("settings");
/// let ctx = builder.context();
/// let data = builder.build()?;
///
/// assert!(data.put("volume", &7i32).is_err()); // not built yet
/// data.initialize(&ctx)?;
///
/// data.put("volume", &7i32)?;
/// assert_eq!(data.get::<i32>("volume")?, Some(7));
/// ```
pub struct Data {
    facade: DefaultFacade,
    init_lock: Mutex<()>,
    built: AtomicBool,
}

impl Data {
    /// Create a builder for persistence configuration.
    pub fn builder() -> PersistenceBuilder {
        PersistenceBuilder::new()
    }

    fn new(facade: DefaultFacade) -> Self {
        Self {
            facade,
            init_lock: Mutex::new(()),
            built: AtomicBool::new(false),
        }
    }

    /// Initialize the backing store and open the gate.
    ///
    /// Calls are serialized. Every call forwards to the store, which treats
    /// an already open store as a no-op and reopens a closed one. A failed
    /// first initialization leaves the handle not built, so it can be
    /// retried.
    pub fn initialize(&self, ctx: &StoreContext) -> Result<()> {
        let _guard = self.init_lock.lock();
        self.facade.store().initialize(ctx)?;

        if self.built.swap(true, Ordering::AcqRel) {
            debug!(storage_tag = %ctx.storage_tag, "store reinitialized");
        } else {
            info!(storage_tag = %ctx.storage_tag, "data built");
        }
        Ok(())
    }

    /// Check if `initialize` has completed.
    pub fn is_built(&self) -> bool {
        self.built.load(Ordering::Acquire)
    }

    fn facade(&self) -> Result<&DefaultFacade> {
        if self.is_built() {
            Ok(&self.facade)
        } else {
            Err(Error::NotBuilt)
        }
    }

    /// Store `value` under `key`.
    ///
    /// Returns `Ok(false)` for an empty key or a failed write. A partitioned
    /// value previously stored under `key` is removed once the write lands.
    pub fn put<V: Persist>(&self, key: &str, value: &V) -> Result<bool> {
        let facade = self.facade()?;
        let stored = facade.put(key, value);
        if stored {
            partition::remove(facade, key);
        }
        Ok(stored)
    }

    /// Store `value` as separately written partitions under `key`.
    ///
    /// Returns `Ok(false)` for an empty key, a value reporting no
    /// partitions, or a failed partition write.
    pub fn put_partitioned<P: Partitioned>(&self, key: &str, value: &P) -> Result<bool> {
        Ok(partition::put(self.facade()?, key, value))
    }

    /// Read a partitioned value stored under `key`.
    pub fn get_partitioned<P: Partitioned>(&self, key: &str) -> Result<Option<P>> {
        Ok(partition::get(self.facade()?, key))
    }

    /// Read `key` as `T`.
    pub fn get<T: Persist>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.facade()?.get(key))
    }

    /// Read `key` as `T`, falling back to `default`.
    pub fn get_or<T: Persist>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.facade()?.get_or(key, default))
    }

    /// Read `key` without rebuilding a concrete type.
    pub fn get_value(&self, key: &str) -> Result<Option<Decoded>> {
        Ok(self.facade()?.get_value(key))
    }

    /// Number of stored keys.
    pub fn count(&self) -> Result<u64> {
        Ok(self.facade()?.count())
    }

    /// Remove every key.
    pub fn delete_all(&self) -> Result<bool> {
        Ok(self.facade()?.delete_all())
    }

    /// Remove `key`, including any partitions stored under it.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let facade = self.facade()?;
        let partitions = partition::remove(facade, key);
        let plain = facade.delete(key);
        Ok(plain || partitions)
    }

    /// Remove every key starting with `prefix`.
    pub fn delete_keys_with_prefix(&self, prefix: &str) -> Result<bool> {
        Ok(self.facade()?.delete_keys_with_prefix(prefix))
    }

    /// Check if `key` holds a plain or a partitioned value.
    pub fn contains(&self, key: &str) -> Result<bool> {
        let facade = self.facade()?;
        Ok(facade.contains(key) || partition::stored_count(facade, key).is_some())
    }

    /// Flush and close the backing store.
    ///
    /// A no-op returning false before the handle is built.
    pub fn shutdown(&self) -> bool {
        if !self.is_built() {
            return false;
        }
        self.facade.store().shutdown()
    }

    /// Close the backing store without flushing.
    ///
    /// A no-op returning false before the handle is built.
    pub fn terminate(&self) -> bool {
        if !self.is_built() {
            return false;
        }
        self.facade.store().terminate()
    }
}

enum StoreChoice {
    Memory,
    File,
    Custom(Arc<dyn KeyValueStore>),
}

/// Builder for persistence configuration.
///
/// # Example
///
/// ```ignore
/// // Disk-backed, obfuscated payloads
/// let data = PersistenceBuilder::new()
///     .storage_tag("prefs")
///     .data_dir("./state")
///     .salt("pepper")
///     .register::<Profile>()
///     .build()?;
///
/// // Tests: in memory, default registry
/// let data = PersistenceBuilder::new().build()?;
/// ```
///
/// # Store selection
///
/// | Method | Store | Survives restart |
/// |--------|-------|------------------|
/// | `in_memory()` (default) | `MemoryStore` | No |
/// | `on_disk()` / `data_dir(..)` | `FileStore` | Yes |
/// | `store(..)` | caller supplied | Depends |
pub struct PersistenceBuilder {
    storage_tag: String,
    data_dir: Option<PathBuf>,
    store: StoreChoice,
    encryption: Arc<dyn Encryption>,
    registry: TypeRegistry,
    registration_error: Option<persist_core::Error>,
}

impl PersistenceBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            storage_tag: DEFAULT_STORAGE_TAG.to_string(),
            data_dir: None,
            store: StoreChoice::Memory,
            encryption: Arc::new(NoEncryption),
            registry: TypeRegistry::with_builtins(),
            registration_error: None,
        }
    }

    /// Set the storage tag.
    pub fn storage_tag(mut self, tag: impl Into<String>) -> Self {
        self.storage_tag = tag.into();
        self
    }

    /// Set the data directory and switch to the file store.
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self.store = StoreChoice::File;
        self
    }

    /// Keep everything in memory (default).
    pub fn in_memory(mut self) -> Self {
        self.store = StoreChoice::Memory;
        self
    }

    /// Persist to a snapshot file under the data directory.
    pub fn on_disk(mut self) -> Self {
        self.store = StoreChoice::File;
        self
    }

    /// Use a caller-supplied store.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = StoreChoice::Custom(store);
        self
    }

    /// Use a custom payload transform.
    pub fn encryption(mut self, encryption: Arc<dyn Encryption>) -> Self {
        self.encryption = encryption;
        self
    }

    /// Obfuscate payloads with [`ReverseEncryption`] and this salt.
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.encryption = Arc::new(ReverseEncryption::new(salt));
        self
    }

    /// Replace the type registry.
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an element type.
    ///
    /// A name collision is reported by [`PersistenceBuilder::build`].
    pub fn register<T: Element>(mut self) -> Self {
        if let Err(e) = self.registry.register::<T>() {
            if self.registration_error.is_none() {
                self.registration_error = Some(e);
            }
        }
        self
    }

    /// Store context to pass to [`Data::initialize`].
    pub fn context(&self) -> StoreContext {
        StoreContext {
            storage_tag: self.storage_tag.clone(),
            data_dir: self.data_dir.clone(),
        }
    }

    /// Build the handle. It still has to be initialized.
    pub fn build(self) -> Result<Data> {
        if let Some(e) = self.registration_error {
            return Err(e.into());
        }
        if !self.encryption.init() {
            return Err(persist_core::Error::Validation(
                "encryption failed to initialize".to_string(),
            )
            .into());
        }

        if matches!(self.store, StoreChoice::File) {
            if self.data_dir.is_none() {
                return Err(persist_core::Error::Validation(
                    "file store requires a data directory".to_string(),
                )
                .into());
            }
            self.context().validate()?;
        }

        let store: Arc<dyn KeyValueStore> = match self.store {
            StoreChoice::Memory => Arc::new(MemoryStore::new()),
            StoreChoice::File => Arc::new(FileStore::new()),
            StoreChoice::Custom(store) => store,
        };

        debug!(
            storage_tag = %self.storage_tag,
            types = ?self.registry.names(),
            "building data"
        );
        let codec = PayloadCodec::new(Arc::new(self.registry));
        Ok(Data::new(DefaultFacade::new(store, codec, self.encryption)))
    }
}

impl Default for PersistenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
