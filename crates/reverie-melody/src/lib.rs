//! Melody generation over Reverie memory spaces.
//!
//! This crate owns the second half of the memories-to-melody pipeline:
//! walking a similarity-guided trajectory through a memory store,
//! projecting the walked vectors into the plane, mapping the geometry to
//! notes, and encoding the notes as a MIDI file.
//!
//! ```text
//! MemoryStore ──TrajectoryGenerator──▶ [MemoryId]
//!                                          │
//!               MelodyMapper + Projector ──▶ [Note]
//!                                          │
//!                             NoteEncoder ──▶ .mid
//! ```
//!
//! [`MidiGenerator`] wires the stages into a single call.

pub mod engine;
pub mod error;
pub mod mapper;
pub mod midi;
pub mod projector;
pub mod trajectory;

pub use engine::{GenerationReport, MidiGenerator};
pub use error::{MelodyError, ProjectionError, Result};
pub use mapper::{BASE_DURATION, BASE_PITCH, FALLBACK_NOTE, MelodyMapper, Note};
pub use midi::{DEFAULT_TEMPO, NoteEncoder, SmfEncoder};
pub use projector::{FixedProjector, PcaProjector, Projector};
pub use trajectory::{TrajectoryGenerator, WalkStrategy};
