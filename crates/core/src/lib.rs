//! Core types for Strata persistence
//!
//! This crate defines the pieces shared by every layer:
//! - [`Error`]: the error taxonomy of the write/read chain
//! - [`text`]: the structural text codec
//! - [`TypeDescriptor`] / [`ShapeTag`]: what gets recorded about a stored value
//! - [`TypeRegistry`] / [`TypeHandle`]: closed name-to-type resolution
//! - [`Element`] / [`Persist`] / [`Decoded`]: the value model

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod text;
pub mod value;

pub use descriptor::{ShapeTag, TypeDescriptor};
pub use error::{Error, Result};
pub use registry::{TypeHandle, TypeRegistry};
pub use text::{decode_text, encode_text, GenericValue};
pub use value::{Classification, Decoded, Dynamic, Element, Persist};
