//! TOML configuration for the Reverie CLI.
//!
//! Config is read from an explicit `--config` path, or from the XDG
//! location (`~/.config/reverie/config.toml`) when present, otherwise
//! defaults apply. CLI flags override config values field by field.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use reverie_memory::EmbedderSpec;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

/// Where the memory store snapshot lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot path. Defaults to the XDG data directory.
    pub path: Option<PathBuf>,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "hash" (offline default) or "openai".
    pub provider: String,
    /// Model name (openai provider).
    pub model: Option<String>,
    /// Base URL override (openai provider).
    pub base_url: Option<String>,
    /// API key; falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Vector dimensionality (hash provider).
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            dimensions: None,
        }
    }
}

/// Defaults for the generate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Trajectory length.
    pub length: usize,
    /// Walk strategy name.
    pub strategy: String,
    /// Output MIDI path.
    pub output: PathBuf,
    /// Tempo in microseconds per quarter note.
    pub tempo: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: 15,
            strategy: "random_walk_similar".to_string(),
            output: PathBuf::from("reverie.mid"),
            tempo: reverie_melody::DEFAULT_TEMPO,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse; the XDG path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match xdg_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// The effective store snapshot path.
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("reverie")
                .join("store.json")
        })
    }

    /// Provider settings in the shape the embedder factory expects.
    pub fn embedder_spec(&self) -> EmbedderSpec {
        EmbedderSpec {
            provider: self.embedding.provider.clone(),
            openai_api_key: self.embedding.api_key.clone(),
            openai_model: self.embedding.model.clone(),
            openai_base_url: self.embedding.base_url.clone(),
            dimensions: self.embedding.dimensions,
        }
    }
}

/// Default config file location.
pub fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reverie").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.generation.length, 15);
        assert_eq!(config.generation.strategy, "random_walk_similar");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [embedding]
            provider = "openai"
            model = "text-embedding-3-small"

            [generation]
            length = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.generation.length, 30);
        assert_eq!(config.generation.strategy, "random_walk_similar");
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/reverie.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
