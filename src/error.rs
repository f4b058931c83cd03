//! Unified error type for Strata persistence.
//!
//! Data operations report expected failures (bad keys, unreadable values)
//! as `false`/`None`. The errors here are the loud ones.

use thiserror::Error;

/// All Strata persistence errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A data operation ran before `initialize` completed
    #[error("data is not built, call initialize() and wait for it to finish")]
    NotBuilt,

    /// Configuration, codec, type or storage failure
    #[error(transparent)]
    Core(#[from] persist_core::Error),
}

/// Result type for Strata persistence operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is the lifecycle gate refusing an operation.
    pub fn is_not_built(&self) -> bool {
        matches!(self, Error::NotBuilt)
    }

    /// Check if this is a configuration error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Core(persist_core::Error::Validation(_)))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Core(persist_core::Error::Io(e))
    }
}
