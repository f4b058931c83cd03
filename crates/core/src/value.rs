//! Value model for persisted data
//!
//! Stored values come in four shapes. A value's shape and the type names it
//! carries are captured at write time through [`Persist::classify`]; a read
//! produces a shape-tagged [`Decoded`] tree which [`Persist::from_decoded`]
//! turns back into the caller's type.
//!
//! ## Shapes
//!
//! | Rust type | Shape | Sampled names |
//! |-----------|-------|---------------|
//! | any [`Element`] | Object | the value's own type |
//! | `Vec<T>`, `VecDeque<T>` | List | element at position 0 |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | Map | first entry's key and value |
//! | `HashSet<T>`, `BTreeSet<T>` | Set | first element yielded |
//!
//! A collection is described by a single sampled element. Collections whose
//! elements report different type names are not reconstructed faithfully.
//!
//! ## Nested containers
//!
//! A collection element must itself be an [`Element`], so `Vec<Vec<T>>` is
//! not [`Persist`]. Two ways to store nested data:
//!
//! - [`GenericValue`] is a builtin element (`Json`), so `Vec<GenericValue>`
//!   or `HashMap<String, GenericValue>` hold arbitrarily nested trees.
//! - A named wrapper keeps the inner type:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Row(Vec<i64>);
//!
//! impl Element for Row {
//!     const TYPE_NAME: &'static str = "Row";
//! }
//!
//! // Vec<Row> is a List of Row
//! ```

use crate::descriptor::ShapeTag;
use crate::error::{Error, Result};
use crate::registry::{TypeHandle, TypeRegistry};
use crate::text::{from_generic, to_generic, GenericValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

/// A value with a stable registry identifier
///
/// `type_name` is the runtime sample recorded when the value (or a
/// collection containing it) is written. It defaults to `TYPE_NAME`.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Item(u32);
///
/// impl Element for Item {
///     const TYPE_NAME: &'static str = "Item";
/// }
/// ```
pub trait Element: Serialize + DeserializeOwned + Send + 'static {
    /// Identifier the type is registered under
    const TYPE_NAME: &'static str;

    /// Identifier recorded for this particular value
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

macro_rules! builtin_elements {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Element for $ty {
                const TYPE_NAME: &'static str = $name;
            }
        )*

        pub(crate) fn register_builtins(registry: &mut TypeRegistry) {
            $(registry.insert(TypeHandle::of::<$ty>());)*
        }
    };
}

builtin_elements! {
    String => "String",
    char => "Character",
    bool => "Boolean",
    i8 => "Byte",
    i16 => "Short",
    i32 => "Integer",
    i64 => "Long",
    u8 => "UByte",
    u16 => "UShort",
    u32 => "UInteger",
    u64 => "ULong",
    f32 => "Float",
    f64 => "Double",
    GenericValue => "Json",
}

/// Shape and sampled type names of a value about to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Structural shape
    pub shape: ShapeTag,
    /// Own type, element type or map key type
    pub key_type_name: Option<&'static str>,
    /// Map value type
    pub value_type_name: Option<&'static str>,
}

impl Classification {
    /// A plain value of the given type
    pub fn object(type_name: &'static str) -> Self {
        Self {
            shape: ShapeTag::Object,
            key_type_name: Some(type_name),
            value_type_name: None,
        }
    }

    /// An ordered sequence, `None` when empty
    pub fn list(element: Option<&'static str>) -> Self {
        Self {
            shape: ShapeTag::List,
            key_type_name: element,
            value_type_name: None,
        }
    }

    /// An unordered collection, `None` when empty
    pub fn set(element: Option<&'static str>) -> Self {
        Self {
            shape: ShapeTag::Set,
            key_type_name: element,
            value_type_name: None,
        }
    }

    /// An associative container, `None` when empty
    pub fn map(entry: Option<(&'static str, &'static str)>) -> Self {
        Self {
            shape: ShapeTag::Map,
            key_type_name: entry.map(|(k, _)| k),
            value_type_name: entry.map(|(_, v)| v),
        }
    }
}

/// A decoded element
///
/// `Typed` elements were precisely re-decoded through a resolved handle.
/// `Generic` elements kept their untyped structural form because no handle
/// was available.
pub enum Dynamic {
    /// Element decoded into a registered type
    Typed {
        /// Identifier of the handle that produced the value
        type_name: String,
        /// The concrete value
        value: Box<dyn Any + Send>,
    },
    /// Untyped structural form
    Generic(GenericValue),
}

impl Dynamic {
    /// Wrap a value produced by `handle`
    pub fn typed(handle: &TypeHandle, value: Box<dyn Any + Send>) -> Self {
        Dynamic::Typed {
            type_name: handle.name().to_string(),
            value,
        }
    }

    /// Check if this element was precisely typed
    pub fn is_typed(&self) -> bool {
        matches!(self, Dynamic::Typed { .. })
    }

    /// Identifier of the producing handle, if typed
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Dynamic::Typed { type_name, .. } => Some(type_name),
            Dynamic::Generic(_) => None,
        }
    }

    /// Structural form, if untyped
    pub fn as_generic(&self) -> Option<&GenericValue> {
        match self {
            Dynamic::Typed { .. } => None,
            Dynamic::Generic(g) => Some(g),
        }
    }

    /// Borrow a typed element as `T`
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Dynamic::Typed { value, .. } => value.downcast_ref::<T>(),
            Dynamic::Generic(_) => None,
        }
    }

    /// Rebuild the element as `T`
    ///
    /// Typed elements must have been produced for exactly `T`. Generic
    /// elements go through serde.
    pub fn into_element<T: Element>(self) -> Result<T> {
        match self {
            Dynamic::Typed { type_name, value } => {
                value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
                    Error::Conversion(format!(
                        "stored element type {} cannot be read as {}",
                        type_name,
                        T::TYPE_NAME
                    ))
                })
            }
            Dynamic::Generic(g) => from_generic(g).map_err(|e| {
                Error::Conversion(format!("untyped element as {}: {}", T::TYPE_NAME, e))
            }),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Typed { type_name, .. } => f.debug_tuple("Typed").field(type_name).finish(),
            Dynamic::Generic(g) => f.debug_tuple("Generic").field(g).finish(),
        }
    }
}

/// Shape-tagged result of a read
#[derive(Debug)]
pub enum Decoded {
    /// A plain value
    Object(Dynamic),
    /// Ordered elements
    List(Vec<Dynamic>),
    /// Set elements, in decode order
    Set(Vec<Dynamic>),
    /// Key/value pairs, in decode order
    Map(Vec<(Dynamic, Dynamic)>),
}

impl Decoded {
    /// Shape of the decoded value
    pub fn shape(&self) -> ShapeTag {
        match self {
            Decoded::Object(_) => ShapeTag::Object,
            Decoded::List(_) => ShapeTag::List,
            Decoded::Set(_) => ShapeTag::Set,
            Decoded::Map(_) => ShapeTag::Map,
        }
    }

    /// Number of elements (an Object counts as one)
    pub fn len(&self) -> usize {
        match self {
            Decoded::Object(_) => 1,
            Decoded::List(items) | Decoded::Set(items) => items.len(),
            Decoded::Map(pairs) => pairs.len(),
        }
    }

    /// Check if a collection came back empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn shape_mismatch(expected: ShapeTag, decoded: &Decoded) -> Error {
    Error::Conversion(format!(
        "expected {} shape, stored value is {}",
        expected,
        decoded.shape()
    ))
}

/// A value the facade can store
pub trait Persist: Sized {
    /// Shape and sampled type names, taken at write time
    fn classify(&self) -> Classification;

    /// Structural form handed to the text codec
    fn to_generic(&self) -> Result<GenericValue>;

    /// Rebuild the value from a read
    fn from_decoded(decoded: Decoded) -> Result<Self>;
}

impl<T: Element> Persist for T {
    fn classify(&self) -> Classification {
        Classification::object(self.type_name())
    }

    fn to_generic(&self) -> Result<GenericValue> {
        to_generic(self)
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        match decoded {
            Decoded::Object(element) => element.into_element(),
            other => Err(shape_mismatch(ShapeTag::Object, &other)),
        }
    }
}

fn list_from_decoded<T: Element, C: FromIterator<T>>(decoded: Decoded) -> Result<C> {
    match decoded {
        Decoded::List(items) => items.into_iter().map(Dynamic::into_element).collect(),
        other => Err(shape_mismatch(ShapeTag::List, &other)),
    }
}

fn set_from_decoded<T: Element, C: FromIterator<T>>(decoded: Decoded) -> Result<C> {
    match decoded {
        Decoded::Set(items) => items.into_iter().map(Dynamic::into_element).collect(),
        other => Err(shape_mismatch(ShapeTag::Set, &other)),
    }
}

fn map_from_decoded<K: Element, V: Element, C: FromIterator<(K, V)>>(
    decoded: Decoded,
) -> Result<C> {
    match decoded {
        Decoded::Map(pairs) => pairs
            .into_iter()
            .map(|(k, v)| -> Result<(K, V)> { Ok((k.into_element()?, v.into_element()?)) })
            .collect(),
        other => Err(shape_mismatch(ShapeTag::Map, &other)),
    }
}

/// Maps are written as `[[key, value], ...]` so keys need not be strings
fn pairs_to_generic<'a, K, V, I>(entries: I) -> Result<GenericValue>
where
    K: Element,
    V: Element,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let pairs = entries
        .map(|(k, v)| -> Result<GenericValue> {
            Ok(GenericValue::Array(vec![to_generic(k)?, to_generic(v)?]))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(GenericValue::Array(pairs))
}

impl<T: Element> Persist for Vec<T> {
    fn classify(&self) -> Classification {
        Classification::list(self.first().map(Element::type_name))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        to_generic(self)
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        list_from_decoded(decoded)
    }
}

impl<T: Element> Persist for VecDeque<T> {
    fn classify(&self) -> Classification {
        Classification::list(self.front().map(Element::type_name))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        to_generic(self)
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        list_from_decoded(decoded)
    }
}

impl<T: Element + Eq + Hash> Persist for HashSet<T> {
    fn classify(&self) -> Classification {
        Classification::set(self.iter().next().map(Element::type_name))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        to_generic(self)
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        set_from_decoded(decoded)
    }
}

impl<T: Element + Ord> Persist for BTreeSet<T> {
    fn classify(&self) -> Classification {
        Classification::set(self.iter().next().map(Element::type_name))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        to_generic(self)
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        set_from_decoded(decoded)
    }
}

impl<K: Element + Eq + Hash, V: Element> Persist for HashMap<K, V> {
    fn classify(&self) -> Classification {
        Classification::map(self.iter().next().map(|(k, v)| (k.type_name(), v.type_name())))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        pairs_to_generic(self.iter())
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        map_from_decoded(decoded)
    }
}

impl<K: Element + Ord, V: Element> Persist for BTreeMap<K, V> {
    fn classify(&self) -> Classification {
        Classification::map(self.iter().next().map(|(k, v)| (k.type_name(), v.type_name())))
    }

    fn to_generic(&self) -> Result<GenericValue> {
        pairs_to_generic(self.iter())
    }

    fn from_decoded(decoded: Decoded) -> Result<Self> {
        map_from_decoded(decoded)
    }
}
