//! Partitioned values.
//!
//! A [`Partitioned`] value is split into independently stored parts. Each
//! part goes through the facade on its own, with its own shape and type
//! names, so a large aggregate can mix objects and collections.
//!
//! # Key layout
//!
//! | Key | Content |
//! |-----|---------|
//! | `{key}.partitions` | partition count, a `UInteger` |
//! | `{key}.type` | [`Partitioned::TYPE_NAME`] of the writer |
//! | `{key}.{i}` | partition `i` |
//!
//! A write first removes whatever partitions were stored under the key. If
//! any partition fails to write, everything written for the key is removed
//! again and the write returns false.

use crate::facade::DefaultFacade;
use persist_core::Persist;
use tracing::{debug, error, warn};

/// A value stored as several independently typed partitions
///
/// ```ignore
/// struct Account {
///     profile: Profile,
///     history: Vec<Item>,
/// }
///
/// impl Partitioned for Account {
///     const TYPE_NAME: &'static str = "Account";
///
///     fn partition_count(&self) -> usize {
///         2
///     }
///
///     fn write_partition(&self, index: usize, slot: PartitionSlot<'_>) -> bool {
///         match index {
///             0 => slot.write(&self.profile),
///             1 => slot.write(&self.history),
///             _ => false,
///         }
///     }
///
///     fn read_partitions(reader: &PartitionReader<'_>) -> Option<Self> {
///         Some(Account {
///             profile: reader.read(0)?,
///             history: reader.read(1)?,
///         })
///     }
/// }
/// ```
pub trait Partitioned: Sized {
    /// Identifier recorded under `{key}.type` and checked on read
    const TYPE_NAME: &'static str;

    /// Number of partitions to write. Zero refuses the write.
    fn partition_count(&self) -> usize;

    /// Write partition `index`. Returning false aborts the whole write.
    ///
    /// Leaving the slot unwritten stores nothing for that index.
    fn write_partition(&self, index: usize, slot: PartitionSlot<'_>) -> bool;

    /// Rebuild the value from its stored partitions
    fn read_partitions(reader: &PartitionReader<'_>) -> Option<Self>;
}

/// Destination for one partition
pub struct PartitionSlot<'a> {
    facade: &'a DefaultFacade,
    key: String,
    index: usize,
}

impl PartitionSlot<'_> {
    /// Partition index this slot writes
    pub fn index(&self) -> usize {
        self.index
    }

    /// Store `value` as this partition
    pub fn write<V: Persist>(self, value: &V) -> bool {
        self.facade.put(&self.key, value)
    }
}

/// Read access to the partitions stored under one key
pub struct PartitionReader<'a> {
    facade: &'a DefaultFacade,
    key: &'a str,
    count: usize,
}

impl PartitionReader<'_> {
    /// Number of stored partitions
    pub fn count(&self) -> usize {
        self.count
    }

    /// Read partition `index` as `T`
    pub fn read<T: Persist>(&self, index: usize) -> Option<T> {
        if index >= self.count {
            warn!(key = %self.key, index, count = self.count, "partition index out of range");
            return None;
        }
        self.facade.get(&partition_key(self.key, index))
    }
}

fn count_key(key: &str) -> String {
    format!("{}.partitions", key)
}

fn type_key(key: &str) -> String {
    format!("{}.type", key)
}

fn partition_key(key: &str, index: usize) -> String {
    format!("{}.{}", key, index)
}

/// Stored partition count, `None` when `key` holds no partitioned value
pub(crate) fn stored_count(facade: &DefaultFacade, key: &str) -> Option<usize> {
    if !facade.contains(&count_key(key)) {
        return None;
    }
    facade
        .get::<u32>(&count_key(key))
        .filter(|count| *count > 0)
        .map(|count| count as usize)
}

pub(crate) fn put<P: Partitioned>(facade: &DefaultFacade, key: &str, value: &P) -> bool {
    if key.is_empty() {
        warn!("partitioned put with empty key");
        return false;
    }

    let count = value.partition_count();
    let marker = match u32::try_from(count) {
        Ok(0) => {
            warn!(key = %key, type_name = P::TYPE_NAME, "no partitions reported");
            return false;
        }
        Ok(marker) => marker,
        Err(_) => {
            warn!(key = %key, count, "too many partitions");
            return false;
        }
    };

    remove(facade, key);
    facade.delete(key);

    let marked = facade.put(&count_key(key), &marker)
        && facade.put(&type_key(key), &P::TYPE_NAME.to_string());
    if !marked {
        error!(key = %key, "could not mark partitioned value");
        remove_all(facade, key, count);
        return false;
    }

    for index in 0..count {
        let slot = PartitionSlot {
            facade,
            key: partition_key(key, index),
            index,
        };
        if !value.write_partition(index, slot) {
            error!(key = %key, index, type_name = P::TYPE_NAME, "partition write failed");
            remove_all(facade, key, count);
            return false;
        }
    }

    debug!(key = %key, partitions = count, type_name = P::TYPE_NAME, "partitioned value stored");
    true
}

pub(crate) fn get<P: Partitioned>(facade: &DefaultFacade, key: &str) -> Option<P> {
    let count = stored_count(facade, key)?;

    let stored_type = facade.get::<String>(&type_key(key));
    if stored_type.as_deref() != Some(P::TYPE_NAME) {
        warn!(
            key = %key,
            stored = ?stored_type,
            requested = P::TYPE_NAME,
            "partitioned value type mismatch"
        );
        return None;
    }

    let reader = PartitionReader { facade, key, count };
    let value = P::read_partitions(&reader);
    if value.is_none() {
        warn!(key = %key, partitions = count, type_name = P::TYPE_NAME, "partitions could not be read");
    }
    value
}

/// Remove the partitions stored under `key`
///
/// Returns true if a partitioned value was stored and its marker removed.
pub(crate) fn remove(facade: &DefaultFacade, key: &str) -> bool {
    match stored_count(facade, key) {
        Some(count) => remove_all(facade, key, count),
        None => false,
    }
}

fn remove_all(facade: &DefaultFacade, key: &str, count: usize) -> bool {
    for index in 0..count {
        facade.delete(&partition_key(key, index));
    }
    facade.delete(&type_key(key));
    facade.delete(&count_key(key))
}
