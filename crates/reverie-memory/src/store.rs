//! The memory store: compressed representations keyed by stable ids.
//!
//! A [`MemoryStore`] owns both the compressed representation and the raw
//! text of every memory, plus a monotonically increasing id counter. Ids
//! are assigned at insertion and never reused or renumbered. Entries are
//! never mutated in place; the only whole-state mutation is [`MemoryStore::load`],
//! which replaces everything from a JSON snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compressor::{Compressor, Representation, require_similarity};
use crate::error::{MemoryError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Memory Id
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque, monotonically increasing memory identifier.
///
/// Unique per store, assigned at insertion time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct MemoryId(u64);

impl MemoryId {
    /// Construct an id from its raw value (for CLI arguments and tests).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Format
// ─────────────────────────────────────────────────────────────────────────────

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    next_id: u64,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    id: MemoryId,
    text: String,
    representation: Representation,
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store of compressed memories, parameterized by a compressor.
///
/// Invariants: the representation map and the text map always share an
/// identical key set, and `next_id` strictly exceeds every issued id.
///
/// Not designed for concurrent mutation; `add` and `load` require exclusive
/// access.
pub struct MemoryStore<C: Compressor> {
    compressor: C,
    representations: BTreeMap<MemoryId, Representation>,
    texts: BTreeMap<MemoryId, String>,
    next_id: u64,
}

impl<C: Compressor> MemoryStore<C> {
    /// Create an empty store over the given compressor.
    pub fn new(compressor: C) -> Self {
        Self {
            compressor,
            representations: BTreeMap::new(),
            texts: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Compress and insert a text, returning its assigned id.
    pub fn add(&mut self, text: impl Into<String>) -> Result<MemoryId> {
        let text = text.into();
        let representation = self.compressor.compress(&text)?;

        let id = MemoryId(self.next_id);
        self.representations.insert(id, representation);
        self.texts.insert(id, text);
        self.next_id += 1;

        debug!(%id, "stored memory");
        Ok(id)
    }

    /// Score every stored memory against a query text and return those with
    /// score ≥ `threshold`, sorted by descending score (ties keep ascending
    /// id order).
    ///
    /// Requires the similarity capability; compressors without it fail with
    /// [`MemoryError::Unsupported`].
    pub fn find_similar(&self, text: &str, threshold: f32) -> Result<Vec<(MemoryId, f32)>> {
        let sim = require_similarity(&self.compressor)?;
        let query = self.compressor.compress(text)?;

        let mut matches = Vec::new();
        for (&id, representation) in &self.representations {
            let score = sim.similarity(&query, representation)?;
            if score >= threshold {
                matches.push((id, score));
            }
        }

        // Stable sort: equal scores stay in insertion-id order.
        matches.sort_by(|a, b| b.1.total_cmp(&a.1));

        debug!(count = matches.len(), threshold, "similarity search");
        Ok(matches)
    }

    /// Look up a representation by id.
    pub fn get(&self, id: MemoryId) -> Option<&Representation> {
        self.representations.get(&id)
    }

    /// Look up a representation by id, failing with `NotFound`.
    pub fn representation(&self, id: MemoryId) -> Result<&Representation> {
        self.representations
            .get(&id)
            .ok_or(MemoryError::NotFound(id))
    }

    /// Look up an embedding vector by id.
    ///
    /// Fails with `NotFound` for unknown ids and `KindMismatch` when the
    /// store holds a non-embedding representation kind.
    pub fn embedding(&self, id: MemoryId) -> Result<&[f32]> {
        self.representation(id)?.as_embedding()
    }

    /// Look up the raw text of a memory.
    pub fn text(&self, id: MemoryId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    /// Iterate all ids in ascending (insertion) order.
    pub fn ids(&self) -> impl Iterator<Item = MemoryId> + '_ {
        self.representations.keys().copied()
    }

    /// Whether the given id exists in the store.
    pub fn contains(&self, id: MemoryId) -> bool {
        self.representations.contains_key(&id)
    }

    /// Number of stored memories.
    pub fn len(&self) -> usize {
        self.representations.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    /// Borrow the configured compressor.
    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Write a JSON snapshot of the full store state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let entries = self
            .representations
            .iter()
            .map(|(&id, representation)| SnapshotEntry {
                id,
                // Invariant: both maps share a key set.
                text: self.texts[&id].clone(),
                representation: representation.clone(),
            })
            .collect();

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            next_id: self.next_id,
            entries,
        };

        let json = serde_json::to_string(&snapshot)?;
        std::fs::write(path, json)?;

        info!(?path, memories = self.len(), "saved store snapshot");
        Ok(())
    }

    /// Replace the full store state from a JSON snapshot at `path`.
    ///
    /// This is a replacement, not a merge: all current entries and the id
    /// counter are discarded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MemoryError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut representations = BTreeMap::new();
        let mut texts = BTreeMap::new();
        for entry in snapshot.entries {
            if entry.id.0 >= snapshot.next_id {
                return Err(MemoryError::Snapshot(format!(
                    "entry id {} is not below next_id {}",
                    entry.id, snapshot.next_id
                )));
            }
            representations.insert(entry.id, entry.representation);
            texts.insert(entry.id, entry.text);
        }

        self.representations = representations;
        self.texts = texts;
        self.next_id = snapshot.next_id;

        info!(?path, memories = self.len(), "loaded store snapshot");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
