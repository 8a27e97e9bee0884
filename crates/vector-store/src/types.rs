use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Cosine similarity in `[-1, 1]`; higher is more relevant
    pub score: f32,
    /// Insertion position of the matched entry
    pub position: usize,
    pub payload: String,
}
