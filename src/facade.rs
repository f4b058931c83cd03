//! Typed persistence over a string store.
//!
//! # Write path
//!
//! value → [`ValueConverter::encode`] → [`Encryption::encrypt`] →
//! [`PayloadCodec::serialize`] → [`KeyValueStore::put`]
//!
//! # Read path
//!
//! [`KeyValueStore::get`] → [`PayloadCodec::decode`] →
//! [`Encryption::decrypt`] → [`ValueConverter::decode`] →
//! [`Persist::from_decoded`]
//!
//! Every step that fails is logged and turns the call into `false` or
//! `None`. Nothing on these paths panics.

use crate::converter::ValueConverter;
use crate::encryption::Encryption;
use persist_core::{Decoded, Persist};
use persist_storage::KeyValueStore;
use persist_wire::PayloadCodec;
use std::sync::Arc;
use tracing::{debug, warn};

/// Facade over a backing store
pub struct DefaultFacade {
    store: Arc<dyn KeyValueStore>,
    codec: PayloadCodec,
    converter: ValueConverter,
    encryption: Arc<dyn Encryption>,
}

impl DefaultFacade {
    /// Assemble a facade from its parts
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        codec: PayloadCodec,
        encryption: Arc<dyn Encryption>,
    ) -> Self {
        Self {
            store,
            codec,
            converter: ValueConverter::new(),
            encryption,
        }
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Store `value` under `key`
    ///
    /// Returns false for an empty key or when any step fails.
    pub fn put<V: Persist>(&self, key: &str, value: &V) -> bool {
        if key.is_empty() {
            warn!("put with empty key");
            return false;
        }

        let plain = match self.converter.encode(value) {
            Ok(plain) => plain,
            Err(e) => {
                warn!(key = %key, error = %e, "value conversion failed");
                return false;
            }
        };
        debug!(key = %key, len = plain.len(), "converted");

        let payload = match self.encryption.encrypt(key, &plain) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "encryption failed");
                return false;
            }
        };

        let envelope = match self.codec.serialize(payload, value) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = %key, error = %e, "envelope encoding failed");
                return false;
            }
        };

        let stored = self.store.put(key, &envelope);
        if stored {
            debug!(key = %key, "stored");
        } else {
            warn!(key = %key, "store rejected put");
        }
        stored
    }

    /// Read `key` as `T`
    ///
    /// Absent keys and unreadable values are `None`.
    pub fn get<T: Persist>(&self, key: &str) -> Option<T> {
        let decoded = self.get_value(key)?;
        match T::from_decoded(decoded) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "stored value does not fit requested type");
                None
            }
        }
    }

    /// Read `key` as `T`, falling back to `default`
    pub fn get_or<T: Persist>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Read `key` without rebuilding a concrete type
    ///
    /// Degraded reads show up here as generic elements or empty collections.
    pub fn get_value(&self, key: &str) -> Option<Decoded> {
        let envelope = match self.store.get(key) {
            Some(envelope) => envelope,
            None => {
                debug!(key = %key, "not found");
                return None;
            }
        };

        let descriptor = self.codec.decode(&envelope)?;

        let plain = match self.encryption.decrypt(key, &descriptor.payload) {
            Ok(plain) => plain,
            Err(e) => {
                warn!(key = %key, error = %e, "decryption failed");
                return None;
            }
        };

        match self.converter.decode(&plain, &descriptor) {
            Ok(decoded) => {
                debug!(key = %key, shape = %decoded.shape(), len = decoded.len(), "decoded");
                Some(decoded)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "value conversion failed");
                None
            }
        }
    }

    /// Number of stored keys
    pub fn count(&self) -> u64 {
        self.store.count()
    }

    /// Remove every key
    pub fn delete_all(&self) -> bool {
        self.store.delete_all()
    }

    /// Remove `key`
    pub fn delete(&self, key: &str) -> bool {
        self.store.delete(key)
    }

    /// Remove every key starting with `prefix`
    pub fn delete_keys_with_prefix(&self, prefix: &str) -> bool {
        self.store.delete_keys_with_prefix(prefix)
    }

    /// Check if `key` is stored
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains(key)
    }
}
