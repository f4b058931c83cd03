//! Closed type registry
//!
//! Stored type names are resolved against an explicit table populated by
//! the host application at startup. There is no dynamic loading: a name
//! that was never registered simply does not resolve.

use crate::error::{Error, Result};
use crate::text::decode_text;
use crate::value::{register_builtins, Element};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DecodeFn = fn(&str) -> Result<Box<dyn Any + Send>>;

fn decode_as<T: Element>(text: &str) -> Result<Box<dyn Any + Send>> {
    let value: T = decode_text(text)?;
    Ok(Box::new(value))
}

/// A resolved type, usable to decode text into a concrete value
#[derive(Clone)]
pub struct TypeHandle {
    name: Arc<str>,
    type_id: TypeId,
    decode: DecodeFn,
}

impl TypeHandle {
    /// Handle for a registered element type
    pub fn of<T: Element>() -> Self {
        Self {
            name: Arc::from(T::TYPE_NAME),
            type_id: TypeId::of::<T>(),
            decode: decode_as::<T>,
        }
    }

    /// Stable identifier this handle was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type behind the handle
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check whether the handle decodes into `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Decode element text into this handle's exact type
    pub fn decode(&self, text: &str) -> Result<Box<dyn Any + Send>> {
        (self.decode)(text)
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle").field(&self.name).finish()
    }
}

/// Mapping from stable type identifiers to type handles
///
/// # Example
///
/// ```ignore
/// let mut registry = TypeRegistry::with_builtins();
/// registry.register::<Item>()?;
/// let handle = registry.resolve("Item")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeHandle>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in scalar types
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register an element type under its `TYPE_NAME`
    ///
    /// Registering the same type twice is a no-op. Binding a name that is
    /// already taken by a different type is a validation error.
    pub fn register<T: Element>(&mut self) -> Result<&mut Self> {
        let conflict = self
            .types
            .get(T::TYPE_NAME)
            .map(|existing| !existing.is::<T>());
        match conflict {
            Some(true) => Err(Error::Validation(format!(
                "type name {} is already registered to another type",
                T::TYPE_NAME
            ))),
            Some(false) => Ok(self),
            None => {
                self.insert(TypeHandle::of::<T>());
                Ok(self)
            }
        }
    }

    pub(crate) fn insert(&mut self, handle: TypeHandle) {
        self.types.insert(handle.name().to_string(), handle);
    }

    /// Resolve a stored type name
    pub fn resolve(&self, name: &str) -> Result<TypeHandle> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TypeResolution(format!("no type registered as {}", name)))
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
