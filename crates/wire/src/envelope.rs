//! Envelope text format
//!
//! The envelope is the unit actually written under a key:
//!
//! ```json
//! {"payload":"<base64>","shapeTag":"1","keyTypeName":"Item"}
//! ```
//!
//! | Field | Encoding |
//! |-------|----------|
//! | `payload` | standard base64 of the payload bytes |
//! | `shapeTag` | `"0"` Object, `"1"` List, `"2"` Map, `"3"` Set |
//! | `keyTypeName` | string, omitted when absent |
//! | `valueTypeName` | string, Map only, omitted when absent |

use base64::Engine;
use persist_core::{decode_text, encode_text, Error, Result, ShapeTag, TypeDescriptor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRecord {
    payload: String,
    shape_tag: ShapeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_type_name: Option<String>,
}

/// Render the persisted fields of a descriptor as envelope text
pub fn encode_envelope(descriptor: &TypeDescriptor) -> Result<String> {
    let record = EnvelopeRecord {
        payload: base64::engine::general_purpose::STANDARD.encode(&descriptor.payload),
        shape_tag: descriptor.shape,
        key_type_name: descriptor.key_type_name.clone(),
        value_type_name: descriptor.value_type_name.clone(),
    };
    encode_text(&record)
}

/// Parse envelope text into an unresolved descriptor
pub fn decode_envelope(text: &str) -> Result<TypeDescriptor> {
    let record: EnvelopeRecord = decode_text(text)?;
    let payload = base64::engine::general_purpose::STANDARD
        .decode(record.payload.as_bytes())
        .map_err(|e| Error::Codec(format!("invalid base64 payload: {}", e)))?;

    Ok(TypeDescriptor::new(
        payload,
        record.shape_tag,
        record.key_type_name,
        record.value_type_name,
    ))
}
