//! Wire encoding for Strata persistence
//!
//! This crate implements the envelope contract: the JSON text written to the
//! backing store for every key. An envelope carries the (possibly
//! transformed) payload bytes as base64 alongside the shape tag and the type
//! names sampled at write time.
//!
//! ## Examples
//!
//! ```
//! use persist_core::TypeRegistry;
//! use persist_wire::PayloadCodec;
//! use std::sync::Arc;
//!
//! let codec = PayloadCodec::new(Arc::new(TypeRegistry::with_builtins()));
//! let text = codec.serialize(b"42".to_vec(), &42i32).unwrap();
//! assert_eq!(text, r#"{"payload":"NDI=","shapeTag":"0","keyTypeName":"Integer"}"#);
//!
//! let descriptor = codec.decode(&text).unwrap();
//! assert!(descriptor.has_resolved_key());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod envelope;

pub use codec::PayloadCodec;
pub use envelope::{decode_envelope, encode_envelope};
