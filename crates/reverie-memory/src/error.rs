//! Error types for the memory crate.

use thiserror::Error;

use crate::store::MemoryId;

/// Errors that can occur in the memory crate.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A capability (similarity, expand) was invoked on a compressor
    /// variant that does not provide it. Recoverable: callers can pick a
    /// different path or compressor.
    #[error("compressor '{compressor}' does not support {capability}")]
    Unsupported {
        /// The missing capability, e.g. "similarity" or "expand".
        capability: &'static str,
        /// Name of the compressor that lacks it.
        compressor: String,
    },

    /// Requested memory id is not present in the store.
    #[error("memory {0} not found")]
    NotFound(MemoryId),

    /// Two representations of different kinds were compared, or an
    /// operation required a kind the store does not hold.
    #[error("representation kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Not enough memories in the store for the requested operation.
    #[error("store has {available} memories, operation needs {needed}")]
    Insufficient { needed: usize, available: usize },

    /// The embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Persistence I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted snapshot could not be used (e.g. unknown version).
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
