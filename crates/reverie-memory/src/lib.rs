//! Semantic memory for Reverie.
//!
//! This crate owns the first half of the memories-to-melody pipeline:
//! compressing short texts into compact representations, storing them under
//! stable ids, searching them by similarity, and blending stored vectors
//! into new synthetic ones.
//!
//! # Architecture
//!
//! ```text
//! text ──compress──▶ Representation ──add──▶ MemoryStore
//!                                               │
//!                          find_similar ◀───────┤
//!                          MemoryBlender ◀──────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use reverie_memory::{EmbeddingCompressor, HashEmbedder, MemoryStore};
//!
//! let compressor = EmbeddingCompressor::new(HashEmbedder::new(64));
//! let mut store = MemoryStore::new(compressor);
//!
//! let id = store.add("the mind moves through memory like a melody")?;
//! store.add("topology can inform melodic contours")?;
//!
//! let similar = store.find_similar("memory and melody", -1.0)?;
//! assert!(!similar.is_empty());
//! assert!(store.contains(id));
//! # Ok::<(), reverie_memory::MemoryError>(())
//! ```

pub mod blender;
pub mod compressor;
pub mod embedder;
pub mod error;
pub mod store;

pub use blender::{MemoryBlender, mutate};
pub use compressor::{
    Compressor, DEFAULT_NUM_PERM, EmbeddingCompressor, MinHashCompressor, Representation,
    Similarity, TokenCompressor, cosine_similarity, require_similarity,
};
pub use embedder::{
    DEFAULT_DIMENSIONS, Embedder, EmbedderSpec, HashEmbedder, OpenAiEmbedder,
    OpenAiEmbedderConfig, build_embedder,
};
pub use error::{MemoryError, Result};
pub use store::{MemoryId, MemoryStore};
