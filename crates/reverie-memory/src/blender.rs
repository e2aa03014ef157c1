//! Memory blending: deriving synthetic vectors from stored ones.
//!
//! An augmentation utility layered on an embedding-kind store. Blends are
//! element-wise means of sampled memory vectors, renormalized to unit
//! length; [`mutate`] perturbs a vector with Gaussian noise instead.
//!
//! All randomness comes from an injected generator so blends are
//! reproducible under a fixed seed.

use rand::Rng;
use rand::seq::index::sample;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::compressor::{Compressor, require_similarity};
use crate::error::{MemoryError, Result};
use crate::store::{MemoryId, MemoryStore};

/// Blending utility over an embedding-kind store.
pub struct MemoryBlender<'a, C: Compressor> {
    store: &'a MemoryStore<C>,
}

impl<'a, C: Compressor> MemoryBlender<'a, C> {
    /// Create a blender over the given store.
    pub fn new(store: &'a MemoryStore<C>) -> Self {
        Self { store }
    }

    /// Blend `k` distinct uniformly sampled memories into a new unit vector.
    ///
    /// Fails with [`MemoryError::Insufficient`] if the store holds fewer
    /// than `k` memories.
    pub fn blend_random(&self, k: usize, rng: &mut impl Rng) -> Result<Vec<f32>> {
        let ids: Vec<MemoryId> = self.store.ids().collect();
        if k == 0 || ids.len() < k {
            return Err(MemoryError::Insufficient {
                needed: k.max(1),
                available: ids.len(),
            });
        }

        let chosen: Vec<MemoryId> = sample(rng, ids.len(), k)
            .into_iter()
            .map(|i| ids[i])
            .collect();
        debug!(?chosen, "blending random memories");
        self.mean_of(&chosen)
    }

    /// Blend with memories similar to `current`.
    ///
    /// Scores every other memory against `current`, keeps the `top_k`
    /// highest-scoring candidates, and uniformly samples min(`k`, `top_k`)
    /// of them to average. Requires the similarity capability.
    pub fn blend_nearby(
        &self,
        current: MemoryId,
        k: usize,
        top_k: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<f32>> {
        let sim = require_similarity(self.store.compressor())?;
        let current_rep = self.store.representation(current)?;

        let mut candidates = Vec::new();
        for id in self.store.ids() {
            if id == current {
                continue;
            }
            let score = sim.similarity(current_rep, self.store.representation(id)?)?;
            candidates.push((id, score));
        }
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(top_k);

        let take = k.min(candidates.len());
        if take == 0 {
            return Err(MemoryError::Insufficient {
                needed: 1,
                available: 0,
            });
        }

        let chosen: Vec<MemoryId> = sample(rng, candidates.len(), take)
            .into_iter()
            .map(|i| candidates[i].0)
            .collect();
        debug!(%current, ?chosen, "blending nearby memories");
        self.mean_of(&chosen)
    }

    /// Element-wise mean of the given memories' vectors, renormalized.
    fn mean_of(&self, ids: &[MemoryId]) -> Result<Vec<f32>> {
        let first = self.store.embedding(ids[0])?;
        let mut mean = vec![0.0f32; first.len()];
        for &id in ids {
            let vector = self.store.embedding(id)?;
            for (acc, &x) in mean.iter_mut().zip(vector.iter()) {
                *acc += x;
            }
        }
        for acc in &mut mean {
            *acc /= ids.len() as f32;
        }
        normalize(mean)
    }
}

/// Add independent Gaussian noise scaled by `noise_level` to each component
/// and renormalize to unit length.
pub fn mutate(vector: &[f32], noise_level: f32, rng: &mut impl Rng) -> Result<Vec<f32>> {
    let mutated = vector
        .iter()
        .map(|&x| {
            let noise: f32 = rng.sample(StandardNormal);
            x + noise * noise_level
        })
        .collect();
    normalize(mutated)
}

/// Scale a vector to unit L2 norm.
fn normalize(mut vector: Vec<f32>) -> Result<Vec<f32>> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return Err(MemoryError::Embedding(
            "blend produced a zero or non-finite vector".to_string(),
        ));
    }
    for x in &mut vector {
        *x /= norm;
    }
    Ok(vector)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
