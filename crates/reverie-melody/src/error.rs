//! Error types for the melody crate.

use thiserror::Error;

/// Errors that can occur while generating a melody.
#[derive(Debug, Error)]
pub enum MelodyError {
    /// An unrecognized trajectory strategy name. A configuration error,
    /// surfaced immediately and never retried.
    #[error("trajectory strategy '{0}' is not implemented")]
    UnknownStrategy(String),

    /// The memory store holds nothing to generate from.
    #[error("memory store is empty, cannot generate")]
    EmptyStore,

    /// Trajectory generation produced no steps.
    #[error("trajectory generation produced no steps")]
    EmptyTrajectory,

    /// Mapping produced no notes.
    #[error("melody mapping produced no notes")]
    EmptyMelody,

    /// An underlying memory operation failed (missing capability, unknown
    /// id, representation kind mismatch).
    #[error(transparent)]
    Memory(#[from] reverie_memory::MemoryError),

    /// The note encoder failed. In-memory state is unaffected.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Writing the encoded file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for melody operations.
pub type Result<T> = std::result::Result<T, MelodyError>;

/// Errors raised by a 2D projector.
///
/// These never cross the mapper boundary: the mapper absorbs any projector
/// failure into the fixed fallback note.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The input is too degenerate to project (too few points, zero
    /// variance).
    #[error("degenerate projection input: {0}")]
    Degenerate(String),

    /// The projection routine itself failed.
    #[error("projection failed: {0}")]
    Failed(String),
}
