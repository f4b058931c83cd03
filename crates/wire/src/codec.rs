//! Payload codec
//!
//! Wraps opaque payload bytes in a type descriptor on write, and resolves
//! the recorded type names against the registry on read.

use crate::envelope::{decode_envelope, encode_envelope};
use persist_core::{Error, Persist, Result, TypeDescriptor, TypeHandle, TypeRegistry};
use std::sync::Arc;
use tracing::{trace, warn};

/// Builds and parses envelopes around payload bytes
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    registry: Arc<TypeRegistry>,
}

impl PayloadCodec {
    /// Create a codec resolving names against `registry`
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// The registry names are resolved against
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Classify `value` and describe it around `payload`
    ///
    /// The payload must not be empty.
    pub fn encode<V: Persist>(&self, payload: Vec<u8>, value: &V) -> Result<TypeDescriptor> {
        if payload.is_empty() {
            return Err(Error::Validation(
                "payload should not be null or empty".to_string(),
            ));
        }

        let classification = value.classify();
        trace!(
            shape = %classification.shape,
            key_type = ?classification.key_type_name,
            value_type = ?classification.value_type_name,
            "classified value"
        );
        Ok(TypeDescriptor::from_classification(payload, classification))
    }

    /// Classify `value` and render the envelope text in one step
    pub fn serialize<V: Persist>(&self, payload: Vec<u8>, value: &V) -> Result<String> {
        let descriptor = self.encode(payload, value)?;
        encode_envelope(&descriptor)
    }

    /// Parse envelope text and resolve its type names
    ///
    /// Returns `None` for a malformed envelope. A name that does not
    /// resolve is logged and left unresolved.
    pub fn decode(&self, envelope: &str) -> Option<TypeDescriptor> {
        let mut descriptor = match decode_envelope(envelope) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(error = %e, "malformed envelope");
                return None;
            }
        };

        descriptor.key_type = self.resolve(descriptor.key_type_name.as_deref());
        descriptor.value_type = self.resolve(descriptor.value_type_name.as_deref());

        trace!(
            shape = %descriptor.shape,
            key_type = ?descriptor.key_type,
            value_type = ?descriptor.value_type,
            "decoded envelope"
        );
        Some(descriptor)
    }

    fn resolve(&self, name: Option<&str>) -> Option<TypeHandle> {
        let name = name?;
        match self.registry.resolve(name) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(type_name = name, error = %e, "stored type name not resolved");
                None
            }
        }
    }
}
