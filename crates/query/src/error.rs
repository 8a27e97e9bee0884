use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] docqa_vector_store::VectorStoreError),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] docqa_chunker::ChunkerError),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("Empty query")]
    EmptyQuery,
}
