//! CLI command handlers.

pub mod add;
pub mod generate;
pub mod list;
pub mod similar;

use anyhow::{Context as _, Result};
use tracing::debug;

use reverie_memory::{Embedder, EmbeddingCompressor, MemoryStore, build_embedder};

use crate::config::Config;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// The store type every command works with.
pub type CliStore = MemoryStore<EmbeddingCompressor<Box<dyn Embedder>>>;

/// Build the configured store, loading the snapshot if one exists.
pub fn open_store(ctx: &Context) -> Result<CliStore> {
    let embedder = build_embedder(&ctx.config.embedder_spec())?;
    let mut store = MemoryStore::new(EmbeddingCompressor::new(embedder));

    let path = ctx.config.store_path();
    debug!(path = %path.display(), "opening memory store");
    if path.exists() {
        store
            .load(&path)
            .with_context(|| format!("failed to load store at {}", path.display()))?;
    }
    Ok(store)
}

/// Persist the store to the configured snapshot path.
pub fn save_store(ctx: &Context, store: &CliStore) -> Result<()> {
    let path = ctx.config.store_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    store
        .save(&path)
        .with_context(|| format!("failed to save store at {}", path.display()))
}
