//! Lifecycle Gate Tests
//!
//! Nothing goes through before `initialize`; racing initializers are
//! serialized, and a shut down store is reopened by initializing again.

use crate::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use strata_persist::MemoryStore;

/// Memory store that counts `initialize` calls and flags overlapping ones
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    initialized: AtomicUsize,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
}

impl KeyValueStore for CountingStore {
    fn initialize(&self, ctx: &StoreContext) -> persist_core::Result<()> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(2));
        self.initialized.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.initialize(ctx)
    }
    fn shutdown(&self) -> bool {
        self.inner.shutdown()
    }
    fn terminate(&self) -> bool {
        self.inner.terminate()
    }
    fn put(&self, key: &str, value: &str) -> bool {
        self.inner.put(key, value)
    }
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
    fn delete(&self, key: &str) -> bool {
        self.inner.delete(key)
    }
    fn delete_all(&self) -> bool {
        self.inner.delete_all()
    }
    fn count(&self) -> u64 {
        self.inner.count()
    }
    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

// =============================================================================
// GATE
// =============================================================================

#[test]
fn test_every_operation_refused_before_initialize() {
    init_tracing();
    let data = PersistenceBuilder::new().register::<Item>().build().unwrap();
    assert!(!data.is_built());

    assert!(data.put("k", &Item(1)).unwrap_err().is_not_built());
    assert!(data.get::<Item>("k").unwrap_err().is_not_built());
    assert!(data.get_or("k", Item(0)).unwrap_err().is_not_built());
    assert!(data.get_value("k").unwrap_err().is_not_built());
    assert!(data.count().unwrap_err().is_not_built());
    assert!(data.delete("k").unwrap_err().is_not_built());
    assert!(data.delete_all().unwrap_err().is_not_built());
    assert!(data.delete_keys_with_prefix("k").unwrap_err().is_not_built());
    assert!(data.contains("k").unwrap_err().is_not_built());

    assert!(!data.shutdown());
    assert!(!data.terminate());
    assert!(!data.is_built());
}

#[test]
fn test_not_built_error_message() {
    let data = PersistenceBuilder::new().build().unwrap();
    let err = data.count().unwrap_err();
    assert!(err.to_string().contains("initialize()"));
}

#[test]
fn test_initialize_flips_gate() {
    init_tracing();
    let builder = PersistenceBuilder::new();
    let ctx = builder.context();
    let data = builder.build().unwrap();

    data.initialize(&ctx).unwrap();
    assert!(data.is_built());
    assert_eq!(data.count().unwrap(), 0);
}

#[test]
fn test_shutdown_keeps_handle_built() {
    let data = create_data();
    assert!(data.shutdown());
    assert!(data.is_built());
}

#[test]
fn test_initialize_after_shutdown_reopens_file_store() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let builder = PersistenceBuilder::new()
        .register::<Item>()
        .storage_tag("cycle")
        .data_dir(dir.path());
    let ctx = builder.context();
    let data = builder.build().unwrap();

    data.initialize(&ctx).unwrap();
    assert!(data.put("item", &Item(1)).unwrap());
    assert!(data.shutdown());

    // Closed store: still built, but the store refuses work
    assert!(!data.put("item", &Item(2)).unwrap());
    assert_eq!(data.get::<Item>("item").unwrap(), None);

    data.initialize(&ctx).unwrap();
    assert_eq!(data.get::<Item>("item").unwrap(), Some(Item(1)));
    assert!(data.put("item", &Item(2)).unwrap());
    assert_eq!(data.get::<Item>("item").unwrap(), Some(Item(2)));
}

#[test]
fn test_initialize_after_terminate_reloads_from_disk() {
    let dir = TempDir::new().unwrap();
    let builder = PersistenceBuilder::new().data_dir(dir.path());
    let ctx = builder.context();
    let data = builder.build().unwrap();

    data.initialize(&ctx).unwrap();
    assert!(data.put("n", &5i64).unwrap());
    assert!(data.terminate());
    assert_eq!(data.count().unwrap(), 0);

    data.initialize(&ctx).unwrap();
    assert_eq!(data.get::<i64>("n").unwrap(), Some(5));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_initialize_is_serialized() {
    init_tracing();
    let store = Arc::new(CountingStore::default());
    let builder = PersistenceBuilder::new().store(store.clone());
    let ctx = builder.context();
    let data = Arc::new(builder.build().unwrap());

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let data = Arc::clone(&data);
            let barrier = Arc::clone(&barrier);
            let ctx = ctx.clone();
            thread::spawn(move || {
                barrier.wait();
                data.initialize(&ctx).unwrap();
                assert!(data.is_built());
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.initialized.load(Ordering::SeqCst), threads);
    assert!(!store.overlapped.load(Ordering::SeqCst));
    assert!(data.is_built());
}

#[test]
fn test_concurrent_writers_after_build() {
    let data = Arc::new(create_data());
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let data = Arc::clone(&data);
            thread::spawn(move || {
                for i in 0..50u32 {
                    assert!(data.put(&format!("t{}:{}", t, i), &Item(i)).unwrap());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(data.count().unwrap(), 200);
    assert_eq!(data.get::<Item>("t3:49").unwrap(), Some(Item(49)));
}
