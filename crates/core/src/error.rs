//! Error taxonomy for the persistence core.
//!
//! Each variant corresponds to one failure class of the write/read chain.
//! Only the facade decides how loud a failure is: validation and storage
//! failures become `false`/`None`, type resolution failures are absorbed
//! into degraded decode paths, codec and conversion failures make a key
//! read as absent.

use thiserror::Error;

/// All persistence core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller contract violated (empty key, empty payload, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed envelope or payload text
    #[error("codec error: {0}")]
    Codec(String),

    /// A stored type name has no entry in the type registry
    #[error("type resolution error: {0}")]
    TypeResolution(String),

    /// A decoded element could not be rebuilt as the requested type
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Backing store failed to read or commit
    #[error("storage error: {0}")]
    Storage(String),

    /// Byte transform failed in either direction
    #[error("encryption error: {0}")]
    Encryption(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from malformed text.
    pub fn is_codec(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if this error is a type-resolution miss.
    ///
    /// These are never fatal on their own; decode falls back to a
    /// degraded path instead.
    pub fn is_type_resolution(&self) -> bool {
        matches!(self, Error::TypeResolution(_))
    }

    /// Check if this is a conversion error.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(e.to_string())
    }
}
