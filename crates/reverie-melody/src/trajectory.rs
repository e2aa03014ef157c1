//! Trajectory generation: similarity-guided walks through memory space.
//!
//! A trajectory is an ordered sequence of memory ids. The single strategy,
//! [`WalkStrategy::RandomWalkSimilar`], repeatedly scores every other
//! memory against the current one and steps to a uniformly chosen id among
//! the top three most similar candidates. Randomness is injected, so a
//! fixed seed reproduces the walk exactly.

use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use reverie_memory::{Compressor, MemoryId, MemoryStore, require_similarity};

use crate::error::{MelodyError, Result};

/// Candidates considered at each walk step.
const WALK_FANOUT: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Strategy
// ─────────────────────────────────────────────────────────────────────────────

/// Trajectory strategy. A closed set; unknown names fail to parse with
/// [`MelodyError::UnknownStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkStrategy {
    /// Random walk over the top-3 most similar neighbors.
    #[default]
    RandomWalkSimilar,
}

impl FromStr for WalkStrategy {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random_walk_similar" => Ok(WalkStrategy::RandomWalkSimilar),
            other => Err(MelodyError::UnknownStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for WalkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkStrategy::RandomWalkSimilar => write!(f, "random_walk_similar"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator
// ─────────────────────────────────────────────────────────────────────────────

/// Generates trajectories through a semantic memory store.
pub struct TrajectoryGenerator<'a, C: Compressor> {
    store: &'a MemoryStore<C>,
}

impl<'a, C: Compressor> TrajectoryGenerator<'a, C> {
    /// Create a generator over the given store.
    pub fn new(store: &'a MemoryStore<C>) -> Self {
        Self { store }
    }

    /// Generate a trajectory of up to `length` memory ids.
    ///
    /// The walk starts at `start` if it exists in the store, otherwise at a
    /// uniformly random id. An empty store yields an empty trajectory. The
    /// walk stops early, without error, when no candidates remain (a
    /// single-memory store); the result is then shorter than requested.
    ///
    /// Requires the store's compressor to have the similarity capability.
    pub fn generate(
        &self,
        length: usize,
        start: Option<MemoryId>,
        strategy: WalkStrategy,
        rng: &mut impl Rng,
    ) -> Result<Vec<MemoryId>> {
        if self.store.is_empty() || length == 0 {
            return Ok(Vec::new());
        }

        let sim = require_similarity(self.store.compressor()).map_err(MelodyError::Memory)?;
        let ids: Vec<MemoryId> = self.store.ids().collect();

        let mut current = match start.filter(|id| self.store.contains(*id)) {
            Some(id) => id,
            None => match ids.choose(rng) {
                Some(&id) => id,
                None => return Ok(Vec::new()),
            },
        };

        let mut trajectory = vec![current];

        match strategy {
            WalkStrategy::RandomWalkSimilar => {
                for _ in 1..length {
                    let current_rep = self.store.representation(current)?;

                    // Ids come out in ascending insertion order, and the
                    // sort is stable, so equal scores keep a deterministic
                    // order for a fixed store.
                    let mut candidates = Vec::with_capacity(ids.len() - 1);
                    for &id in &ids {
                        if id == current {
                            continue;
                        }
                        let score = sim.similarity(current_rep, self.store.representation(id)?)?;
                        candidates.push((id, score));
                    }
                    if candidates.is_empty() {
                        break;
                    }
                    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

                    let fanout = WALK_FANOUT.min(candidates.len());
                    let next = match candidates[..fanout].choose(rng) {
                        Some(&(id, _)) => id,
                        None => break,
                    };
                    trajectory.push(next);
                    current = next;
                }
            }
        }

        debug!(len = trajectory.len(), requested = length, "generated trajectory");
        Ok(trajectory)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
