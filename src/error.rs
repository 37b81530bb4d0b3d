//! Error types for the FinGen engine
//!
//! Engine mutations are total functions and never return errors; this type
//! covers the persistence boundary and the user directory.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("An account is already registered for {0}")]
    DuplicateEmail(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
