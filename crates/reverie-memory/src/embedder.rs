//! Embedding providers for the dense-vector compressor.
//!
//! An [`Embedder`] turns text into a fixed-dimensional vector. The pipeline
//! is synchronous and batch-oriented, so providers are plain blocking calls.
//! Identical text must produce identical vectors; the whole design leans on
//! that for reproducible trajectories.
//!
//! Providers:
//! - [`HashEmbedder`]: deterministic pseudo-embeddings from a text hash.
//!   The offline default; no model, no network.
//! - [`OpenAiEmbedder`]: the OpenAI embeddings API over a blocking client.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{MemoryError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Embedder Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for text embedding providers.
pub trait Embedder {
    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;

    /// Name of this provider, used in logs and error reporting.
    fn name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hash Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic pseudo-embedding provider.
///
/// Seeds a small LCG with a hash of the text and fills a unit-length vector
/// from it. Texts with identical bytes always map to identical vectors,
/// which makes it suitable both as the offline provider and as a test
/// double for similarity search.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

/// Default dimensionality, matching a small sentence-transformer.
pub const DEFAULT_DIMENSIONS: usize = 384;

impl HashEmbedder {
    /// Create a provider with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut state = djb2(text);
        let mut vector = Vec::with_capacity(self.dimensions);
        for _ in 0..self.dimensions {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            vector.push(((state >> 32) as f32 / (1u64 << 31) as f32) - 1.0);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}

fn djb2(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI embeddings provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Model to use for embeddings.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiEmbedderConfig {
    /// Create a config with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Read the API key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            MemoryError::Embedding("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// OpenAI embeddings API client (blocking).
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbedderConfig,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create a provider from a config.
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MemoryError::Embedding(format!("failed to create HTTP client: {e}")))?;

        let dimensions = match config.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        };

        Ok(Self {
            client,
            config,
            dimensions,
        })
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.config.model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .map_err(|e| MemoryError::Embedding(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(MemoryError::Embedding(format!(
                "embedding request failed: HTTP {status} - {body}"
            )));
        }

        let mut result: EmbeddingResponse = response
            .json()
            .map_err(|e| MemoryError::Embedding(format!("failed to parse response: {e}")))?;

        // Restore request order; the API may return entries out of order.
        result.data.sort_by_key(|e| e.index);
        debug!(model = %self.config.model, "embedded one text");

        result
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| MemoryError::Embedding("no embedding returned".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, serde::Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, serde::Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedder Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Provider-agnostic embedder settings, filled in from application config.
#[derive(Debug, Clone, Default)]
pub struct EmbedderSpec {
    /// Provider name: "hash" or "openai".
    pub provider: String,
    /// OpenAI API key (falls back to `OPENAI_API_KEY`).
    pub openai_api_key: Option<String>,
    /// OpenAI model name.
    pub openai_model: Option<String>,
    /// OpenAI base URL override.
    pub openai_base_url: Option<String>,
    /// Requested dimensions (providers that support it).
    pub dimensions: Option<usize>,
}

/// Build a boxed embedder from a spec.
pub fn build_embedder(spec: &EmbedderSpec) -> Result<Box<dyn Embedder>> {
    match spec.provider.as_str() {
        "" | "hash" => {
            let dims = spec.dimensions.unwrap_or(DEFAULT_DIMENSIONS);
            Ok(Box::new(HashEmbedder::new(dims)))
        }
        "openai" => {
            let mut config = match &spec.openai_api_key {
                Some(key) => OpenAiEmbedderConfig::new(key),
                None => OpenAiEmbedderConfig::from_env()?,
            };
            if let Some(ref model) = spec.openai_model {
                config = config.with_model(model);
            }
            if let Some(ref base_url) = spec.openai_base_url {
                config = config.with_base_url(base_url);
            }
            Ok(Box::new(OpenAiEmbedder::new(config)?))
        }
        other => Err(MemoryError::Embedding(format!(
            "unknown embedding provider '{other}'; valid: hash, openai"
        ))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
