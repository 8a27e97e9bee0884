//! # DocQA Vector Store
//!
//! Exact similarity search over document-chunk embeddings.
//!
//! ## Features
//!
//! - **Exact search**: exhaustive inner product over unit vectors (cosine)
//! - **Deterministic ranking**: descending score, ties by insertion order
//! - **Atomic batches**: a malformed `add` mutates nothing
//! - **Crash-safe persistence**: write-then-rename with a shared generation
//!
//! ## Architecture
//!
//! ```text
//! (vector, chunk text)[]
//!     │
//!     ├──> normalize (pure, zero vector stays zero)
//!     │
//!     ├──> FlatIndex (ndarray matrix, row = insertion position)
//!     │      └─> matrix · query → top-k
//!     │
//!     └──> Store directory
//!            ├─> vectors.bin   (DQV1 header + f32 rows)
//!            └─> payloads.json (schema_version, generation, payloads)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docqa_vector_store::VectorIndex;
//!
//! fn main() -> docqa_vector_store::Result<()> {
//!     let mut index = VectorIndex::open(3, "vector_store")?;
//!
//!     index.add(
//!         &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
//!         &["the cat sat".to_string(), "the dog ran".to_string()],
//!     )?;
//!     index.save()?;
//!
//!     for hit in index.search(&[0.1, 0.9, 0.0], 1)? {
//!         println!("{:.3}: {}", hit.score, hit.payload);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod codec;
mod error;
mod flat_index;
mod paths;
mod payloads;
mod store;
mod types;
mod vector;

pub use error::{Result, VectorStoreError};
pub use paths::{
    payloads_path, vectors_path, DEFAULT_STORE_DIR_NAME, PAYLOADS_FILE_NAME, VECTORS_FILE_NAME,
};
pub use store::VectorIndex;
pub use types::SearchHit;
pub use vector::{cosine_similarity, dot, normalized};
