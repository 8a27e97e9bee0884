use anyhow::{Context, Result};
use clap::ValueEnum;
use docqa_chunker::ChunkerConfig;
use docqa_query::QueryConfig;
use docqa_vector_store::DEFAULT_STORE_DIR_NAME;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "docqa.toml";

pub const ENV_EMBEDDING_MODE: &str = "DOCQA_EMBEDDING_MODE";
pub const ENV_GENERATION_MODE: &str = "DOCQA_GENERATION_MODE";
pub const ENV_STORE_DIR: &str = "DOCQA_STORE_DIR";

/// Which collaborator implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Deterministic offline implementation
    Stub,
    /// OpenAI-compatible HTTP endpoint
    Http,
}

impl BackendMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Http => "http",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stub" => Some(Self::Stub),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: PathBuf,
    /// Embedding dimension; every vector in the store has this length
    pub dimension: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORE_DIR_NAME),
            dimension: 384,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub chat_model: String,
    /// Embeddings endpoint when it differs from `base_url`
    pub embedding_base_url: Option<String>,
    pub embedding_model: String,
    /// Request this vector length from the provider; must equal `store.dimension`
    pub embedding_dimensions: Option<usize>,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub embedding_mode: BackendMode,
    pub generation_mode: BackendMode,
    pub max_retries: usize,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            chat_model: "llama3-8b-8192".to_string(),
            embedding_base_url: None,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            embedding_dimensions: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            // Groq serves no embeddings; http needs embedding_base_url
            embedding_mode: BackendMode::Stub,
            generation_mode: BackendMode::Http,
            max_retries: 3,
            temperature: docqa_query::DEFAULT_TEMPERATURE,
            max_tokens: docqa_query::DEFAULT_MAX_TOKENS,
        }
    }
}

impl ProviderConfig {
    pub fn embedding_base_url(&self) -> &str {
        self.embedding_base_url.as_deref().unwrap_or(&self.base_url)
    }

    /// API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn require_api_key(&self) -> Result<String> {
        self.api_key()
            .with_context(|| format!("{} is not set", self.api_key_env))
    }
}

/// Everything the binary reads from `docqa.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chunker: ChunkerConfig,
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load `explicit`, else `docqa.toml` in the working directory when it
    /// exists, else defaults. Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(mode) = env_mode(ENV_EMBEDDING_MODE) {
            self.provider.embedding_mode = mode;
        }
        if let Some(mode) = env_mode(ENV_GENERATION_MODE) {
            self.provider.generation_mode = mode;
        }
        if let Ok(dir) = env::var(ENV_STORE_DIR) {
            if !dir.trim().is_empty() {
                self.store.dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunker.validate()?;
        anyhow::ensure!(self.store.dimension > 0, "store.dimension must be > 0");
        if let Some(requested) = self.provider.embedding_dimensions {
            anyhow::ensure!(
                requested == self.store.dimension,
                "provider.embedding_dimensions ({requested}) must equal store.dimension ({})",
                self.store.dimension
            );
        }
        Ok(())
    }
}

fn env_mode(var: &str) -> Option<BackendMode> {
    let raw = env::var(var).ok()?;
    let mode = BackendMode::parse(&raw);
    if mode.is_none() {
        log::warn!("Ignoring {var}={raw}: expected stub or http");
    }
    mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[chunker]
chunk_size = 500

[store]
dimension = 64

[provider]
generation_mode = "stub"
"#,
        )
        .unwrap();

        assert_eq!(config.chunker.chunk_size, 500);
        assert_eq!(config.chunker.chunk_overlap, 200);
        assert_eq!(config.store.dimension, 64);
        assert_eq!(config.store.dir, PathBuf::from("vector_store"));
        assert_eq!(config.query.top_k, 5);
        assert_eq!(config.provider.embedding_mode, BackendMode::Stub);
        assert_eq!(config.provider.generation_mode, BackendMode::Stub);
        assert_eq!(config.provider.chat_model, "llama3-8b-8192");
        assert_eq!(config.provider.embedding_dimensions, None);
    }

    #[test]
    fn embeddings_endpoint_falls_back_to_base_url() {
        let mut provider = ProviderConfig::default();
        assert_eq!(provider.embedding_base_url(), "https://api.groq.com/openai/v1");

        provider.embedding_base_url = Some("http://localhost:8080/v1".to_string());
        assert_eq!(provider.embedding_base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn requested_dimensions_must_match_the_store() {
        let mut config = AppConfig::default();
        config.provider.embedding_dimensions = Some(256);
        assert!(config.validate().is_err());

        config.store.dimension = 256;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_chunking_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docqa.toml");
        std::fs::write(&path, "[chunker]\nchunk_size = 10\nchunk_overlap = 10\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn backend_mode_parsing() {
        assert_eq!(BackendMode::parse(" STUB "), Some(BackendMode::Stub));
        assert_eq!(BackendMode::parse("http"), Some(BackendMode::Http));
        assert_eq!(BackendMode::parse("fast"), None);
        assert_eq!(BackendMode::Http.as_str(), "http");
    }
}
