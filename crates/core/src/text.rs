//! Structural text codec
//!
//! Every value that crosses the store boundary goes through these two
//! functions. Decoding always names its target type explicitly; the target
//! may be a composite such as `Vec<GenericValue>` or
//! `Vec<(GenericValue, GenericValue)>`, which is what the two-pass
//! collection decode relies on.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Untyped structural value, the "generic" representation of decoded text.
pub type GenericValue = serde_json::Value;

/// Encode a value to text
pub fn encode_text<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode text into an explicitly supplied target type
///
/// Malformed text, or text whose structure does not fit `T`, is a
/// [`Error::Codec`](crate::Error::Codec).
pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

/// Convert a structural value into a typed one without a text round trip
pub fn from_generic<T: DeserializeOwned>(value: GenericValue) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Convert a typed value into its structural form
pub fn to_generic<T: Serialize + ?Sized>(value: &T) -> Result<GenericValue> {
    Ok(serde_json::to_value(value)?)
}
