//! Convenient imports for Strata persistence.
//!
//! ```ignore
//! use strata_persist::prelude::*;
//!
//! let builder = PersistenceBuilder::new();
//! let data = builder.build()?;
//! ```

// Main entry point
pub use crate::database::{Data, PersistenceBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Value model
pub use persist_core::{Decoded, Dynamic, Element, Persist, TypeRegistry};
pub use crate::partition::{PartitionReader, PartitionSlot, Partitioned};

// Stores
pub use persist_storage::{KeyValueStore, StoreContext};
