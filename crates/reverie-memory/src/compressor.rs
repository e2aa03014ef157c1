//! Semantic compressors: text in, compact representation out.
//!
//! A [`Compressor`] turns raw text into a [`Representation`]. Three variants
//! are provided:
//!
//! - [`TokenCompressor`]: reversible token sequence, no similarity
//! - [`MinHashCompressor`]: fixed-size locality-sensitive signature,
//!   one-way, Jaccard similarity
//! - [`EmbeddingCompressor`]: dense vector from an [`Embedder`], one-way,
//!   cosine similarity
//!
//! Similarity is an optional capability. Variants that support it expose it
//! through [`Compressor::similarity`], which returns `None` for variants
//! that don't. Callers must check the capability before use; absence is a
//! recoverable [`MemoryError::Unsupported`], never a panic.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::embedder::Embedder;
use crate::error::{MemoryError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Representation
// ─────────────────────────────────────────────────────────────────────────────

/// A compressed representation of a text.
///
/// Exactly one kind is used per store instance; the kind is determined by
/// the compressor the store was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Representation {
    /// Reversible token sequence.
    Tokens(Vec<String>),
    /// Fixed-size MinHash signature (one-way).
    Signature(Vec<u64>),
    /// Dense embedding vector (one-way).
    Embedding(Vec<f32>),
}

impl Representation {
    /// Human-readable kind name, used in error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Representation::Tokens(_) => "tokens",
            Representation::Signature(_) => "signature",
            Representation::Embedding(_) => "embedding",
        }
    }

    /// Borrow the embedding vector, or fail with a kind mismatch.
    pub fn as_embedding(&self) -> Result<&[f32]> {
        match self {
            Representation::Embedding(v) => Ok(v),
            other => Err(MemoryError::KindMismatch {
                expected: "embedding",
                found: other.kind(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for semantic compressors.
pub trait Compressor {
    /// Compress text into a representation.
    fn compress(&self, text: &str) -> Result<Representation>;

    /// Expand a representation back into text.
    ///
    /// One-way compressors return [`MemoryError::Unsupported`].
    fn expand(&self, compressed: &Representation) -> Result<String>;

    /// Name of this compressor, used in error reporting.
    fn name(&self) -> &str;

    /// The similarity capability, if this variant provides one.
    ///
    /// Returns `None` for variants without a meaningful pairwise score.
    fn similarity(&self) -> Option<&dyn Similarity> {
        None
    }
}

/// Optional capability: pairwise similarity between two representations.
pub trait Similarity {
    /// Score two representations. Symmetric in its arguments.
    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32>;
}

/// Fetch the similarity capability of a compressor, or fail with a
/// descriptive [`MemoryError::Unsupported`].
pub fn require_similarity(compressor: &dyn Compressor) -> Result<&dyn Similarity> {
    compressor
        .similarity()
        .ok_or_else(|| MemoryError::Unsupported {
            capability: "similarity",
            compressor: compressor.name().to_string(),
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Token Compressor
// ─────────────────────────────────────────────────────────────────────────────

/// Reversible whitespace tokenizer. No similarity capability.
#[derive(Debug, Clone, Default)]
pub struct TokenCompressor;

impl Compressor for TokenCompressor {
    fn compress(&self, text: &str) -> Result<Representation> {
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Ok(Representation::Tokens(tokens))
    }

    fn expand(&self, compressed: &Representation) -> Result<String> {
        match compressed {
            Representation::Tokens(tokens) => Ok(tokens.join(" ")),
            other => Err(MemoryError::KindMismatch {
                expected: "tokens",
                found: other.kind(),
            }),
        }
    }

    fn name(&self) -> &str {
        "token"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MinHash Compressor
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of MinHash permutations.
pub const DEFAULT_NUM_PERM: usize = 128;

/// Locality-sensitive signature compressor.
///
/// Lowercases and tokenizes the text, then builds a MinHash signature over
/// the token set. Signatures are one-way; similarity is the Jaccard
/// estimate between two signatures, symmetric and in [0, 1].
#[derive(Debug, Clone)]
pub struct MinHashCompressor {
    num_perm: usize,
}

impl MinHashCompressor {
    /// Create a compressor with the given number of permutations.
    pub fn new(num_perm: usize) -> Self {
        Self { num_perm }
    }

    /// Signature width in hash slots.
    pub fn num_perm(&self) -> usize {
        self.num_perm
    }
}

impl Default for MinHashCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_PERM)
    }
}

/// Hash a token under a permutation seed.
fn permuted_hash(token: &str, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    token.hash(&mut hasher);
    hasher.finish()
}

/// Derive a well-mixed seed for permutation `i` (splitmix64 finalizer).
fn permutation_seed(i: u64) -> u64 {
    let mut z = i.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl Compressor for MinHashCompressor {
    fn compress(&self, text: &str) -> Result<Representation> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();

        let mut signature = vec![u64::MAX; self.num_perm];
        for token in &tokens {
            for (i, slot) in signature.iter_mut().enumerate() {
                let h = permuted_hash(token, permutation_seed(i as u64));
                if h < *slot {
                    *slot = h;
                }
            }
        }
        Ok(Representation::Signature(signature))
    }

    fn expand(&self, _compressed: &Representation) -> Result<String> {
        // Signatures are one-way.
        Err(MemoryError::Unsupported {
            capability: "expand",
            compressor: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "minhash"
    }

    fn similarity(&self) -> Option<&dyn Similarity> {
        Some(self)
    }
}

impl Similarity for MinHashCompressor {
    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32> {
        let (sa, sb) = match (a, b) {
            (Representation::Signature(sa), Representation::Signature(sb)) => (sa, sb),
            _ => {
                let found = if matches!(a, Representation::Signature(_)) {
                    b.kind()
                } else {
                    a.kind()
                };
                return Err(MemoryError::KindMismatch {
                    expected: "signature",
                    found,
                });
            }
        };

        if sa.len() != sb.len() || sa.is_empty() {
            return Ok(0.0);
        }
        let matching = sa.iter().zip(sb.iter()).filter(|(x, y)| x == y).count();
        Ok(matching as f32 / sa.len() as f32)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedding Compressor
// ─────────────────────────────────────────────────────────────────────────────

/// Dense-vector compressor backed by an [`Embedder`].
///
/// `compress` delegates to the provider; `expand` is unsupported.
/// Similarity is cosine similarity: both vectors are normalized to unit
/// length and their dot product is returned, symmetric and in [-1, 1].
pub struct EmbeddingCompressor<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> EmbeddingCompressor<E> {
    /// Create a compressor over the given embedding provider.
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Borrow the underlying provider.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

impl<E: Embedder> Compressor for EmbeddingCompressor<E> {
    fn compress(&self, text: &str) -> Result<Representation> {
        let vector = self.embedder.embed(text)?;
        Ok(Representation::Embedding(vector))
    }

    fn expand(&self, _compressed: &Representation) -> Result<String> {
        // Embeddings are one-way.
        Err(MemoryError::Unsupported {
            capability: "expand",
            compressor: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        self.embedder.name()
    }

    fn similarity(&self) -> Option<&dyn Similarity> {
        Some(self)
    }
}

impl<E: Embedder> Similarity for EmbeddingCompressor<E> {
    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32> {
        Ok(cosine_similarity(a.as_embedding()?, b.as_embedding()?))
    }
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths or zero-norm inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
