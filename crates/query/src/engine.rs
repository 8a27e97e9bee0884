use crate::collaborators::{Embedder, Generator};
use crate::context::build_context;
use crate::error::{QueryError, Result};
use crate::prompt::{
    build_user_prompt, GENERATION_FAILED_ANSWER, NO_INFORMATION_ANSWER, SYSTEM_INSTRUCTION,
};
use docqa_vector_store::{SearchHit, VectorIndex, VectorStoreError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Retrieval and answering knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Passages retrieved per question
    pub top_k: usize,
    pub embed_timeout_secs: u64,
    pub generate_timeout_secs: u64,
    /// Texts per embedder call during ingestion
    pub embed_batch_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            embed_timeout_secs: 30,
            generate_timeout_secs: 60,
            embed_batch_size: 32,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub const fn embed_timeout(&self) -> Duration {
        Duration::from_secs(self.embed_timeout_secs)
    }

    #[must_use]
    pub const fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

/// Retrieval-augmented answering over one `VectorIndex`.
///
/// The engine owns the index, so `&self` queries can share it while
/// `index_mut` requires exclusive access.
pub struct QueryEngine {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: VectorIndex,
    config: QueryConfig,
}

impl QueryEngine {
    /// Create an engine; the embedder must produce vectors of the index dimension.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        index: VectorIndex,
        config: QueryConfig,
    ) -> Result<Self> {
        if embedder.dimension() != index.dimension() {
            return Err(VectorStoreError::InvalidDimension {
                expected: index.dimension(),
                actual: embedder.dimension(),
            }
            .into());
        }
        log::info!(
            "QueryEngine initialized (dim {}, {} indexed chunks)",
            index.dimension(),
            index.len()
        );
        Ok(Self {
            embedder,
            generator,
            index,
            config,
        })
    }

    /// Join the `k` best passages for an already-embedded query.
    #[must_use]
    pub fn build_context(&self, query_vector: &[f32], k: usize) -> String {
        build_context(&self.index, query_vector, k)
    }

    /// Embed `query`, or `None` when the embedder fails, times out or
    /// returns no usable vector.
    pub async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.try_embed_query(query).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                log::warn!("Query embedding failed: {err}");
                None
            }
        }
    }

    async fn try_embed_query(&self, query: &str) -> Result<Vec<f32>> {
        log::info!("Embedding query: '{}'", preview(query, 50));
        let texts = [query.to_string()];
        let mut vectors = with_timeout(
            "query embedding",
            self.config.embed_timeout(),
            self.embedder.embed(&texts),
        )
        .await?
        .map_err(|e| QueryError::EmbeddingError(format!("{e:#}")))?;

        let vector = vectors
            .pop()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| QueryError::EmbeddingError("Empty embedding result".to_string()))?;
        if vector.len() != self.index.dimension() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.index.dimension(),
                actual: vector.len(),
            }
            .into());
        }
        Ok(vector)
    }

    /// Scored passages for a text query
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let vector = self.try_embed_query(query).await?;
        Ok(self.index.search(&vector, k)?)
    }

    /// Answer `query` from the indexed documents.
    ///
    /// Never fails: an empty context short-circuits to a fixed "no
    /// information" answer without calling the generator, and a generator
    /// error or timeout becomes a fixed failure answer.
    pub async fn ask(&self, query: &str) -> String {
        log::info!("Starting RAG pipeline for a new query.");
        if query.trim().is_empty() {
            log::warn!("Empty question; nothing to retrieve.");
            return NO_INFORMATION_ANSWER.to_string();
        }

        let context = match self.embed_query(query).await {
            Some(vector) => self.build_context(&vector, self.config.top_k),
            None => String::new(),
        };
        if context.trim().is_empty() {
            log::warn!("No context was retrieved for the query. Cannot generate an answer.");
            return NO_INFORMATION_ANSWER.to_string();
        }

        let user_prompt = build_user_prompt(query, &context);
        log::info!("Sending prompt to LLM for answer generation.");
        let answer = with_timeout(
            "answer generation",
            self.config.generate_timeout(),
            self.generator.generate(SYSTEM_INSTRUCTION, &user_prompt),
        )
        .await;

        match answer {
            Ok(Ok(text)) => {
                log::info!("Successfully generated an answer.");
                text.trim().to_string()
            }
            Ok(Err(err)) => {
                log::error!("API error during generation: {err:#}");
                GENERATION_FAILED_ANSWER.to_string()
            }
            Err(err) => {
                log::error!("{err}");
                GENERATION_FAILED_ANSWER.to_string()
            }
        }
    }

    #[must_use]
    pub const fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut VectorIndex {
        &mut self.index
    }

    #[must_use]
    pub fn into_index(self) -> VectorIndex {
        self.index
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }
}

pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    fut: impl Future<Output = T>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| QueryError::Timeout {
            operation,
            seconds: limit.as_secs(),
        })
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
