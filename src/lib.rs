//! # Strata Persist
//!
//! Typed persistence of structured values into string-keyed stores.
//!
//! Values are converted to text, optionally transformed, and wrapped in an
//! envelope that records their shape and element type names. On read the
//! names are resolved against a closed [`TypeRegistry`] and collections are
//! rebuilt element by element.
//!
//! ## Quick Start
//!
//! ```ignore
//! use strata_persist::prelude::*;
//!
//! let builder = PersistenceBuilder::new().register::<Item>();
//! let ctx = builder.context();
//! let data = builder.build()?;
//! data.initialize(&ctx)?;
//!
//! data.put("items", &vec![Item(1), Item(2)])?;
//! let items: Option<Vec<Item>> = data.get("items")?;
//! ```
//!
//! ## Degraded reads
//!
//! | Stored | Handle missing | Result |
//! |--------|----------------|--------|
//! | Object | element type | generic value |
//! | List | element type | generic elements |
//! | Set | element type | empty set |
//! | Map | key or value type | empty map |
//!
//! Use [`Data::get_value`] to inspect a degraded read.
//!
//! ## Partitioned values
//!
//! Aggregates implementing [`Partitioned`] are written with
//! [`Data::put_partitioned`] as one entry per partition plus a count and a
//! type marker. [`Data::delete`] and [`Data::contains`] see both forms.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod converter;
mod database;
mod encryption;
mod error;
mod facade;
mod partition;

pub mod prelude;

// Re-export main entry points
pub use converter::ValueConverter;
pub use database::{Data, PersistenceBuilder};
pub use encryption::{Encryption, NoEncryption, ReverseEncryption};
pub use error::{Error, Result};
pub use facade::DefaultFacade;
pub use partition::{PartitionReader, PartitionSlot, Partitioned};

pub use persist_core::{
    Decoded, Dynamic, Element, GenericValue, Persist, ShapeTag, TypeDescriptor, TypeHandle,
    TypeRegistry,
};
pub use persist_storage::{FileStore, KeyValueStore, MemoryStore, StoreContext};
pub use persist_wire::PayloadCodec;
