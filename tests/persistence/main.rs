//! Persistence Test Suite
//!
//! End-to-end tests through `Data`: builder, lifecycle gate, facade,
//! envelope, partitioned values, and both backing stores.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all persistence tests
//! cargo test --test persistence
//!
//! # Run lifecycle tests only
//! cargo test --test persistence lifecycle::
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Once;

use strata_persist::prelude::*;

// Test modules
pub mod degradation;
pub mod file_store;
pub mod lifecycle;
pub mod properties;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Application element used across the suite
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item(pub u32);

impl Element for Item {
    const TYPE_NAME: &'static str = "Item";
}

/// A struct-shaped element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub tags: Vec<String>,
    pub score: f64,
}

impl Element for Profile {
    const TYPE_NAME: &'static str = "Profile";
}

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Build and initialize a handle from `builder`
pub fn open(builder: PersistenceBuilder) -> Data {
    init_tracing();
    let ctx = builder.context();
    let data = builder.build().expect("build");
    data.initialize(&ctx).expect("initialize");
    data
}

/// In-memory handle with the suite's element types registered
pub fn create_data() -> Data {
    open(
        PersistenceBuilder::new()
            .register::<Item>()
            .register::<Profile>(),
    )
}
