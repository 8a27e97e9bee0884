//! Narrow interfaces to the systems the retrieval core depends on but does
//! not implement.

use async_trait::async_trait;
use std::path::Path;

/// Text → fixed-dimension vectors, one per input, in input order.
///
/// An `Err`, an empty result or vectors of the wrong dimension are all
/// treated by callers as "no usable vector".
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;
}

/// (system instruction, user content) → answer text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<String>;
}

/// File → plain text, or `None` when the file cannot be extracted.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<String>;
}
