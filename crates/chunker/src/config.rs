use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for sliding-window text chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window length in characters (Unicode scalar values)
    pub chunk_size: usize,

    /// Characters shared between consecutive windows
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkerConfig {
    #[must_use]
    pub const fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Create config optimized for embeddings (smaller, focused windows)
    #[must_use]
    pub const fn for_embeddings() -> Self {
        Self::new(512, 64)
    }

    /// Create config optimized for LLM context (larger windows)
    #[must_use]
    pub const fn for_llm_context() -> Self {
        Self::new(2000, 400)
    }

    /// Distance between the starts of consecutive windows.
    ///
    /// Only meaningful for a validated config.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::invalid_config("chunk_size must be > 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkerError::invalid_config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}
