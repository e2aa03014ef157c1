//! End-to-end orchestration: memories in, MIDI file out.
//!
//! [`MidiGenerator`] wires the trajectory generator, the melody mapper, and
//! a note encoder over a borrowed store. Every failure along the pipeline
//! short-circuits with a descriptive error value; nothing panics and no
//! partial output is written. The encoder is only invoked once a non-empty
//! melody exists.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::info;

use reverie_memory::{Compressor, MemoryId, MemoryStore};

use crate::error::{MelodyError, Result};
use crate::mapper::{MelodyMapper, Note};
use crate::midi::NoteEncoder;
use crate::projector::Projector;
use crate::trajectory::{TrajectoryGenerator, WalkStrategy};

/// What a successful generation produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// The walked memory ids, in order.
    pub trajectory: Vec<MemoryId>,
    /// The mapped melody.
    pub notes: Vec<Note>,
    /// Where the encoded file was written.
    pub output: PathBuf,
}

/// Orchestrates trajectory generation, melody mapping, and encoding.
pub struct MidiGenerator<'a, C: Compressor, P: Projector, E: NoteEncoder> {
    store: &'a MemoryStore<C>,
    mapper: MelodyMapper<P>,
    encoder: E,
}

impl<'a, C: Compressor, P: Projector, E: NoteEncoder> MidiGenerator<'a, C, P, E> {
    /// Create a generator over the given store, projector, and encoder.
    pub fn new(store: &'a MemoryStore<C>, projector: P, encoder: E) -> Self {
        Self {
            store,
            mapper: MelodyMapper::new(projector),
            encoder,
        }
    }

    /// Run the full pipeline and write the result to `output`.
    ///
    /// Short-circuits with `EmptyStore`, `EmptyTrajectory`, or `EmptyMelody`
    /// when a stage produces nothing; encoder failures surface as
    /// `Encoding`/`Io` errors without touching in-memory state.
    pub fn generate(
        &self,
        output: impl AsRef<Path>,
        length: usize,
        strategy: WalkStrategy,
        start: Option<MemoryId>,
        rng: &mut impl Rng,
    ) -> Result<GenerationReport> {
        let output = output.as_ref();

        if self.store.is_empty() {
            return Err(MelodyError::EmptyStore);
        }

        info!(length, %strategy, "generating trajectory");
        let trajectory =
            TrajectoryGenerator::new(self.store).generate(length, start, strategy, rng)?;
        if trajectory.is_empty() {
            return Err(MelodyError::EmptyTrajectory);
        }

        let notes = self.mapper.map_trajectory(&trajectory, self.store)?;
        if notes.is_empty() {
            return Err(MelodyError::EmptyMelody);
        }

        self.encoder.encode(&notes, output)?;

        info!(
            steps = trajectory.len(),
            notes = notes.len(),
            ?output,
            "melody generated"
        );
        Ok(GenerationReport {
            trajectory,
            notes,
            output: output.to_path_buf(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::SmfEncoder;
    use crate::projector::PcaProjector;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use reverie_memory::{EmbeddingCompressor, HashEmbedder};
    use std::cell::Cell;

    fn store_with(texts: &[&str]) -> MemoryStore<EmbeddingCompressor<HashEmbedder>> {
        let mut store = MemoryStore::new(EmbeddingCompressor::new(HashEmbedder::new(16)));
        for text in texts {
            store.add(*text).unwrap();
        }
        store
    }

    /// Records whether encode was ever invoked.
    struct RecordingEncoder {
        called: Cell<bool>,
        fail: bool,
    }

    impl RecordingEncoder {
        fn new(fail: bool) -> Self {
            Self {
                called: Cell::new(false),
                fail,
            }
        }
    }

    impl NoteEncoder for &RecordingEncoder {
        fn encode(&self, _notes: &[Note], _path: &Path) -> Result<()> {
            self.called.set(true);
            if self.fail {
                Err(MelodyError::Encoding("scripted failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_empty_store_never_reaches_the_encoder() {
        let store = store_with(&[]);
        let encoder = RecordingEncoder::new(false);
        let generator = MidiGenerator::new(&store, PcaProjector, &encoder);
        let mut rng = StdRng::seed_from_u64(0);

        let err = generator
            .generate("out.mid", 5, WalkStrategy::RandomWalkSimilar, None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MelodyError::EmptyStore));
        assert!(!encoder.called.get());
    }

    #[test]
    fn test_single_memory_store_produces_one_fallback_note() {
        let store = store_with(&["alone"]);
        let encoder = RecordingEncoder::new(false);
        let generator = MidiGenerator::new(&store, PcaProjector, &encoder);
        let mut rng = StdRng::seed_from_u64(0);

        let report = generator
            .generate("out.mid", 5, WalkStrategy::RandomWalkSimilar, None, &mut rng)
            .unwrap();
        // The walk stops early with a single step, which maps to the
        // fallback note, which still gets encoded.
        assert_eq!(report.trajectory.len(), 1);
        assert_eq!(report.notes, vec![Note { pitch: 60, duration: 480 }]);
        assert!(encoder.called.get());
    }

    #[test]
    fn test_encoding_failure_is_reported_not_fatal() {
        let store = store_with(&["a", "b", "c"]);
        let encoder = RecordingEncoder::new(true);
        let generator = MidiGenerator::new(&store, PcaProjector, &encoder);
        let mut rng = StdRng::seed_from_u64(0);

        let err = generator
            .generate("out.mid", 4, WalkStrategy::RandomWalkSimilar, None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MelodyError::Encoding(_)));
        // The store is untouched and usable for another attempt.
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_end_to_end_writes_a_midi_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.mid");

        let store = store_with(&[
            "john matter is an electroacoustic composer",
            "music can emerge from structures",
            "semantic destruction is a creative act",
            "topology can inform melodic contours",
            "the mind moves through memory like a melody",
        ]);
        let generator = MidiGenerator::new(&store, PcaProjector, SmfEncoder::default());
        let mut rng = StdRng::seed_from_u64(42);

        let report = generator
            .generate(&path, 8, WalkStrategy::RandomWalkSimilar, Some(MemoryId::from_raw(0)), &mut rng)
            .unwrap();

        assert_eq!(report.trajectory.len(), 8);
        assert_eq!(report.trajectory[0], MemoryId::from_raw(0));
        assert_eq!(report.notes.len(), 8);
        for note in &report.notes {
            assert!(note.pitch <= 127);
            assert!((60..=960).contains(&note.duration));
        }
        assert!(path.exists());
    }
}
