//! # DocQA Query
//!
//! Retrieval-augmented question answering over an ingested document corpus.
//!
//! ## Pipeline
//!
//! ```text
//! Ingest:  path → DocumentExtractor → clean_text → Chunker → Embedder → VectorIndex
//!
//! Ask:     question → Embedder → VectorIndex::search(top_k)
//!                                    │
//!                                    └─> context ("\n\n---\n\n"-joined passages)
//!                                          │
//!                                          ├─> empty  → fixed "no information" answer
//!                                          └─> Generator(system, context + question)
//! ```
//!
//! Collaborators ([`Embedder`], [`Generator`], [`DocumentExtractor`]) are
//! traits so the core runs offline with [`HashEmbedder`] and
//! [`ExtractiveGenerator`], or against any OpenAI-compatible endpoint with
//! [`OpenAiEmbedder`] and [`ChatGenerator`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docqa_query::{ExtractiveGenerator, HashEmbedder, QueryConfig, QueryEngine};
//! use docqa_vector_store::VectorIndex;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let index = VectorIndex::open(384, "vector_store")?;
//! let engine = QueryEngine::new(
//!     Arc::new(HashEmbedder::new(384)),
//!     Arc::new(ExtractiveGenerator),
//!     index,
//!     QueryConfig::default(),
//! )?;
//! println!("{}", engine.ask("Where do birds fly?").await);
//! # Ok(())
//! # }
//! ```

mod collaborators;
mod context;
mod engine;
mod error;
mod extract;
mod ingest;
mod prompt;
mod providers;
mod stub;

pub use collaborators::{DocumentExtractor, Embedder, Generator};
pub use context::{build_context, split_context, CONTEXT_SEPARATOR};
pub use engine::{QueryConfig, QueryEngine};
pub use error::{QueryError, Result};
pub use extract::{PlainTextExtractor, PLAIN_TEXT_EXTENSIONS};
pub use ingest::{IngestReport, Ingestor};
pub use prompt::{
    build_user_prompt, GENERATION_FAILED_ANSWER, NO_INFORMATION_ANSWER, SYSTEM_INSTRUCTION,
};
pub use providers::{
    list_models, ChatGenerator, OpenAiEmbedder, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    FALLBACK_CHAT_MODELS,
};
pub use stub::{ExtractiveGenerator, HashEmbedder, DEFAULT_STUB_DIMENSION};
