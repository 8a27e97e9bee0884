use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch: {vectors} vectors for {payloads} payloads")]
    CountMismatch { vectors: usize, payloads: usize },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Store corrupt: {0}")]
    StoreCorrupt(String),

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl VectorStoreError {
    /// Whether the error rejects a malformed `add`/`search` argument
    #[must_use]
    pub const fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. } | Self::InvalidDimension { .. }
        )
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::StoreCorrupt(msg.into())
    }
}
