//! Value conversion between typed values and payload text.
//!
//! Encoding renders a value's structural form. Decoding runs the two-pass
//! strategy for collections:
//!
//! | Shape | Pass 1 | Pass 2 (handle resolved) | Handle missing |
//! |-------|--------|--------------------------|----------------|
//! | Object | - | decode into the handle's type | generic value |
//! | List | `Vec<GenericValue>` | re-decode each element | generic elements |
//! | Set | `Vec<GenericValue>` | re-decode each element | empty set |
//! | Map | `Vec<(GenericValue, GenericValue)>` | re-decode each key and value | empty map |
//!
//! A Map needs both handles. Any element failing its re-decode fails the
//! whole call.
//!
//! Encoding refuses values whose text form would read back differently.
//! The structural form has no encoding for non-finite floats and writes
//! them as `null`, so a `NaN` or infinite `f64` is rejected at write time
//! instead of turning into an unreadable entry.

use persist_core::text::from_generic;
use persist_core::{
    decode_text, encode_text, Decoded, Dynamic, Error, GenericValue, Persist, Result, ShapeTag,
    TypeDescriptor, TypeHandle,
};
use tracing::{debug, trace};

/// Converts values to payload text and back
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueConverter;

impl ValueConverter {
    /// Create a converter
    pub fn new() -> Self {
        Self
    }

    /// Render `value` as payload text
    ///
    /// Fails with a conversion error when the rendered form cannot be read
    /// back as `V`.
    pub fn encode<V: Persist>(&self, value: &V) -> Result<String> {
        let generic = value.to_generic()?;
        let text = encode_text(&generic)?;

        let rendered = untyped(value.classify().shape, generic)?;
        V::from_decoded(rendered).map_err(|e| {
            Error::Conversion(format!("value does not survive its text form: {}", e))
        })?;
        Ok(text)
    }

    /// Decode payload text according to `descriptor`
    pub fn decode(&self, text: &str, descriptor: &TypeDescriptor) -> Result<Decoded> {
        let key_type = descriptor.key_type.as_ref();
        match descriptor.shape {
            ShapeTag::Object => {
                let element = match key_type {
                    Some(handle) => Dynamic::typed(handle, handle.decode(text)?),
                    None => Dynamic::Generic(decode_text::<GenericValue>(text)?),
                };
                Ok(Decoded::Object(element))
            }
            ShapeTag::List => {
                let items: Vec<GenericValue> = decode_text(text)?;
                match key_type {
                    Some(handle) => retype_all(handle, items).map(Decoded::List),
                    None => {
                        debug!(len = items.len(), "list element type unresolved, keeping generic form");
                        Ok(Decoded::List(items.into_iter().map(Dynamic::Generic).collect()))
                    }
                }
            }
            ShapeTag::Set => match key_type {
                Some(handle) => {
                    let items: Vec<GenericValue> = decode_text(text)?;
                    retype_all(handle, items).map(Decoded::Set)
                }
                None => {
                    debug!("set element type unresolved, returning empty set");
                    Ok(Decoded::Set(Vec::new()))
                }
            },
            ShapeTag::Map => match (key_type, descriptor.value_type.as_ref()) {
                (Some(key_handle), Some(value_handle)) => {
                    let pairs: Vec<(GenericValue, GenericValue)> = decode_text(text)?;
                    pairs
                        .into_iter()
                        .map(|(k, v)| -> Result<(Dynamic, Dynamic)> {
                            Ok((retype(key_handle, &k)?, retype(value_handle, &v)?))
                        })
                        .collect::<Result<Vec<_>>>()
                        .map(Decoded::Map)
                }
                _ => {
                    debug!("map key or value type unresolved, returning empty map");
                    Ok(Decoded::Map(Vec::new()))
                }
            },
        }
    }
}

/// Second pass: render the generic element back to text and decode it into
/// the handle's exact type
fn retype(handle: &TypeHandle, element: &GenericValue) -> Result<Dynamic> {
    let text = encode_text(element)?;
    trace!(type_name = handle.name(), "re-decoding element");
    Ok(Dynamic::typed(handle, handle.decode(&text)?))
}

fn retype_all(handle: &TypeHandle, items: Vec<GenericValue>) -> Result<Vec<Dynamic>> {
    items.iter().map(|item| retype(handle, item)).collect()
}

/// A freshly rendered value as a read would see it with no handles resolved
fn untyped(shape: ShapeTag, generic: GenericValue) -> Result<Decoded> {
    if shape == ShapeTag::Object {
        return Ok(Decoded::Object(Dynamic::Generic(generic)));
    }
    let items = match generic {
        GenericValue::Array(items) => items,
        other => {
            return Err(Error::Conversion(format!(
                "{} value rendered as {}",
                shape, other
            )))
        }
    };
    Ok(match shape {
        ShapeTag::List => Decoded::List(items.into_iter().map(Dynamic::Generic).collect()),
        ShapeTag::Set => Decoded::Set(items.into_iter().map(Dynamic::Generic).collect()),
        _ => Decoded::Map(
            items
                .into_iter()
                .map(|pair| -> Result<(Dynamic, Dynamic)> {
                    let (k, v): (GenericValue, GenericValue) = from_generic(pair)?;
                    Ok((Dynamic::Generic(k), Dynamic::Generic(v)))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}
