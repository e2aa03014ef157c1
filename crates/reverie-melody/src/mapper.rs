//! Geometry-to-music mapping.
//!
//! The mapper flattens a trajectory's memory vectors to 2D points and turns
//! consecutive deltas into notes: vertical movement shifts pitch, horizontal
//! movement stretches or squeezes duration. Pitch accumulates from step to
//! step; duration is always recomputed from the 480-tick base. That
//! asymmetry is deliberate and load-bearing.
//!
//! Degenerate trajectories (one element, fewer than two distinct vectors,
//! or a failing projector) collapse to the single fallback note (60, 480)
//! rather than erroring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reverie_memory::{Compressor, MemoryId, MemoryStore};

use crate::error::Result;
use crate::projector::Projector;

// ─────────────────────────────────────────────────────────────────────────────
// Notes
// ─────────────────────────────────────────────────────────────────────────────

/// A single monophonic note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch, always in 0..=127.
    pub pitch: u8,
    /// Duration in ticks, always in 60..=960.
    pub duration: u32,
}

/// Reference pitch for the first note of a melody (middle C).
pub const BASE_PITCH: u8 = 60;

/// Reference duration in ticks.
pub const BASE_DURATION: u32 = 480;

/// The note emitted when the trajectory is too degenerate to map.
pub const FALLBACK_NOTE: Note = Note {
    pitch: BASE_PITCH,
    duration: BASE_DURATION,
};

/// Duration floor in ticks.
const MIN_DURATION: u32 = 60;

/// Duration ceiling in ticks.
const MAX_DURATION: u32 = 960;

/// Scale factor from vertical movement to pitch delta.
const PITCH_SCALE: f32 = 5.0;

/// Largest neighborhood hint passed to the projector.
const MAX_NEIGHBORS: usize = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Melody Mapper
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a semantic trajectory to a melody via a 2D projection.
pub struct MelodyMapper<P: Projector> {
    projector: P,
}

impl<P: Projector> MelodyMapper<P> {
    /// Create a mapper over the given projector.
    pub fn new(projector: P) -> Self {
        Self { projector }
    }

    /// Map a trajectory of memory ids to a sequence of notes.
    ///
    /// Returns one note per trajectory element, except: an empty trajectory
    /// maps to no notes, and the degenerate cases described in the module
    /// docs map to exactly `[FALLBACK_NOTE]`.
    ///
    /// Fails only on structural misuse: ids missing from the store or a
    /// non-embedding representation kind.
    pub fn map_trajectory<C: Compressor>(
        &self,
        trajectory: &[MemoryId],
        store: &MemoryStore<C>,
    ) -> Result<Vec<Note>> {
        if trajectory.is_empty() {
            return Ok(Vec::new());
        }
        if trajectory.len() < 2 {
            // The bias mapping needs a delta between two points.
            return Ok(vec![FALLBACK_NOTE]);
        }

        let vectors: Vec<&[f32]> = trajectory
            .iter()
            .map(|&id| store.embedding(id))
            .collect::<reverie_memory::Result<_>>()?;

        // Deduplicate by exact bit equality, keeping first-seen order, and
        // remember which distinct point each trajectory position maps to.
        let mut seen: HashMap<Vec<u32>, usize> = HashMap::new();
        let mut distinct: Vec<Vec<f32>> = Vec::new();
        let mut positions: Vec<usize> = Vec::with_capacity(vectors.len());
        for vector in &vectors {
            let bits: Vec<u32> = vector.iter().map(|x| x.to_bits()).collect();
            let index = *seen.entry(bits).or_insert_with(|| {
                distinct.push(vector.to_vec());
                distinct.len() - 1
            });
            positions.push(index);
        }

        if distinct.len() < 2 {
            warn!(
                distinct = distinct.len(),
                "not enough distinct vectors to project, emitting fallback note"
            );
            return Ok(vec![FALLBACK_NOTE]);
        }

        let n_neighbors = MAX_NEIGHBORS.min(distinct.len() - 1).max(2);
        let points = match self.projector.project(&distinct, n_neighbors) {
            Ok(points) if points.len() == distinct.len() => points,
            Ok(points) => {
                warn!(
                    expected = distinct.len(),
                    got = points.len(),
                    "projector returned wrong point count, emitting fallback note"
                );
                return Ok(vec![FALLBACK_NOTE]);
            }
            Err(e) => {
                warn!(error = %e, "projection failed, emitting fallback note");
                return Ok(vec![FALLBACK_NOTE]);
            }
        };

        let notes = points_to_notes(positions.iter().map(|&i| points[i]));
        debug!(notes = notes.len(), "mapped trajectory to melody");
        Ok(notes)
    }
}

/// Walk a 2D point sequence, turning deltas into notes.
fn points_to_notes(points: impl Iterator<Item = [f32; 2]>) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut last_point: Option<[f32; 2]> = None;
    let mut last_pitch = BASE_PITCH;

    for point in points {
        let note = match last_point {
            None => FALLBACK_NOTE,
            Some(prev) => {
                let dx = point[0] - prev[0];
                let dy = point[1] - prev[1];

                let pitch_shift = (dy * PITCH_SCALE).round() as i32;
                let pitch = (last_pitch as i32 + pitch_shift).clamp(0, 127) as u8;

                // Duration derives from the base every step, never from the
                // previous note.
                let modifier = (1.0 + dx).clamp(0.5, 2.0);
                let duration = ((BASE_DURATION as f32 / modifier).round() as u32)
                    .clamp(MIN_DURATION, MAX_DURATION);

                Note { pitch, duration }
            }
        };
        last_pitch = note.pitch;
        last_point = Some(point);
        notes.push(note);
    }
    notes
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{FixedProjector, PcaProjector};
    use reverie_memory::{EmbeddingCompressor, HashEmbedder};

    fn store_with(texts: &[&str]) -> MemoryStore<EmbeddingCompressor<HashEmbedder>> {
        let mut store = MemoryStore::new(EmbeddingCompressor::new(HashEmbedder::new(16)));
        for text in texts {
            store.add(*text).unwrap();
        }
        store
    }

    fn ids(raw: &[u64]) -> Vec<MemoryId> {
        raw.iter().copied().map(MemoryId::from_raw).collect()
    }

    #[test]
    fn test_empty_trajectory_maps_to_no_notes() {
        let store = store_with(&["a"]);
        let mapper = MelodyMapper::new(PcaProjector);
        assert!(mapper.map_trajectory(&[], &store).unwrap().is_empty());
    }

    #[test]
    fn test_single_element_trajectory_is_fallback() {
        let store = store_with(&["a"]);
        let mapper = MelodyMapper::new(PcaProjector);
        let notes = mapper.map_trajectory(&ids(&[0]), &store).unwrap();
        assert_eq!(notes, vec![FALLBACK_NOTE]);
    }

    #[test]
    fn test_identical_vectors_yield_fallback() {
        // Three copies of the same text compress to identical vectors.
        let store = store_with(&["a", "a", "a"]);
        let mapper = MelodyMapper::new(PcaProjector);
        let notes = mapper.map_trajectory(&ids(&[0, 1, 2]), &store).unwrap();
        assert_eq!(notes, vec![Note { pitch: 60, duration: 480 }]);
    }

    #[test]
    fn test_two_point_geometry_maps_exactly() {
        let store = store_with(&["first", "second"]);
        let mapper = MelodyMapper::new(FixedProjector::new(vec![[0.0, 0.0], [1.0, 2.0]]));

        let notes = mapper.map_trajectory(&ids(&[0, 1]), &store).unwrap();
        // dy=2 → pitch 60 + round(2·5) = 70; dx=1 → modifier 2 → duration 240.
        assert_eq!(
            notes,
            vec![
                Note { pitch: 60, duration: 480 },
                Note { pitch: 70, duration: 240 },
            ]
        );
    }

    #[test]
    fn test_pitch_accumulates_but_duration_does_not() {
        let store = store_with(&["a", "b", "c"]);
        let mapper = MelodyMapper::new(FixedProjector::new(vec![
            [0.0, 0.0],
            [0.2, 1.0],
            [0.4, 2.0],
        ]));

        let notes = mapper.map_trajectory(&ids(&[0, 1, 2]), &store).unwrap();
        // Pitch climbs 5 per step; duration recomputes from 480 each step.
        assert_eq!(notes[1].pitch, 65);
        assert_eq!(notes[2].pitch, 70);
        assert_eq!(notes[1].duration, notes[2].duration);
        assert_eq!(notes[1].duration, 400); // round(480 / 1.2)
    }

    #[test]
    fn test_extreme_deltas_are_clamped() {
        let store = store_with(&["a", "b", "c"]);
        let mapper = MelodyMapper::new(FixedProjector::new(vec![
            [0.0, 0.0],
            [100.0, 100.0],
            [0.0, -500.0],
        ]));

        let notes = mapper.map_trajectory(&ids(&[0, 1, 2]), &store).unwrap();
        // Huge upward jump pins pitch at 127, modifier at 2.0.
        assert_eq!(notes[1], Note { pitch: 127, duration: 240 });
        // Huge drop pins pitch at 0; dx=-100 pins modifier at 0.5 → 960.
        assert_eq!(notes[2], Note { pitch: 0, duration: 960 });
    }

    #[test]
    fn test_duplicate_positions_share_projected_points() {
        let store = store_with(&["a", "b"]);
        // Two distinct vectors even though the trajectory revisits id 0.
        let mapper = MelodyMapper::new(FixedProjector::new(vec![[0.0, 0.0], [1.0, 2.0]]));

        let notes = mapper.map_trajectory(&ids(&[0, 1, 0]), &store).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1], Note { pitch: 70, duration: 240 });
        // Stepping back to the first point inverts the delta: pitch drops
        // by 10, and dx = −1 pins the modifier at 0.5 → duration 960.
        assert_eq!(notes[2], Note { pitch: 60, duration: 960 });
    }

    #[test]
    fn test_projector_failure_is_absorbed() {
        let store = store_with(&["a", "b", "c"]);
        // Wrong point count forces a projector error.
        let mapper = MelodyMapper::new(FixedProjector::new(vec![[0.0, 0.0]]));
        let notes = mapper.map_trajectory(&ids(&[0, 1, 2]), &store).unwrap();
        assert_eq!(notes, vec![FALLBACK_NOTE]);
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let store = store_with(&["a", "b", "c", "d"]);
        let mapper = MelodyMapper::new(PcaProjector);
        let trajectory = ids(&[0, 1, 2, 3, 1]);

        let first = mapper.map_trajectory(&trajectory, &store).unwrap();
        let second = mapper.map_trajectory(&trajectory, &store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_notes_stay_in_range() {
        let store = store_with(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let mapper = MelodyMapper::new(PcaProjector);
        let trajectory = ids(&[0, 3, 1, 7, 2, 6, 4, 5, 0, 7]);

        let notes = mapper.map_trajectory(&trajectory, &store).unwrap();
        assert_eq!(notes.len(), trajectory.len());
        for note in &notes {
            assert!(note.pitch <= 127);
            assert!((60..=960).contains(&note.duration));
        }
    }

    #[test]
    fn test_missing_id_is_a_structural_error() {
        let store = store_with(&["a", "b"]);
        let mapper = MelodyMapper::new(PcaProjector);
        let err = mapper.map_trajectory(&ids(&[0, 99]), &store).unwrap_err();
        assert!(matches!(err, crate::error::MelodyError::Memory(_)));
    }
}
