//! Type descriptors
//!
//! A [`TypeDescriptor`] records the shape of a stored value and the type
//! names sampled from it at write time. The persisted half (payload, shape,
//! names) travels inside the envelope; the resolved [`TypeHandle`]s are
//! attached only while decoding and are never written.

use crate::registry::TypeHandle;
use crate::value::Classification;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator selecting the structural decode path
///
/// Wire tags are the single characters `0`..`3` and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeTag {
    /// A plain value
    #[serde(rename = "0")]
    Object,
    /// Ordered sequence
    #[serde(rename = "1")]
    List,
    /// Associative container
    #[serde(rename = "2")]
    Map,
    /// Unordered collection of distinct elements
    #[serde(rename = "3")]
    Set,
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeTag::Object => "Object",
            ShapeTag::List => "List",
            ShapeTag::Map => "Map",
            ShapeTag::Set => "Set",
        };
        f.write_str(name)
    }
}

/// Shape and type metadata for one stored value
///
/// Created fresh for every write and every read. The only mutation after
/// construction is attaching resolved handles during decode.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Opaque payload bytes, produced by the byte transform
    pub payload: Vec<u8>,
    /// Which structural decode path applies
    pub shape: ShapeTag,
    /// Element type (List/Set), key type (Map) or own type (Object)
    pub key_type_name: Option<String>,
    /// Value type, Map only
    pub value_type_name: Option<String>,
    /// Resolved handle for `key_type_name`
    pub key_type: Option<TypeHandle>,
    /// Resolved handle for `value_type_name`
    pub value_type: Option<TypeHandle>,
}

impl TypeDescriptor {
    /// Create a descriptor with unresolved handles
    ///
    /// A value type name on anything but a Map is dropped.
    pub fn new(
        payload: Vec<u8>,
        shape: ShapeTag,
        key_type_name: Option<String>,
        value_type_name: Option<String>,
    ) -> Self {
        let value_type_name = match shape {
            ShapeTag::Map => value_type_name,
            _ => None,
        };
        Self {
            payload,
            shape,
            key_type_name,
            value_type_name,
            key_type: None,
            value_type: None,
        }
    }

    /// Create a descriptor from a write-time classification
    pub fn from_classification(payload: Vec<u8>, classification: Classification) -> Self {
        Self::new(
            payload,
            classification.shape,
            classification.key_type_name.map(str::to_string),
            classification.value_type_name.map(str::to_string),
        )
    }

    /// True for List, Map and Set
    pub fn is_collection(&self) -> bool {
        !matches!(self.shape, ShapeTag::Object)
    }

    /// True if the key/element handle was resolved
    pub fn has_resolved_key(&self) -> bool {
        self.key_type.is_some()
    }

    /// True if both Map handles were resolved
    pub fn has_resolved_pair(&self) -> bool {
        self.key_type.is_some() && self.value_type.is_some()
    }
}
