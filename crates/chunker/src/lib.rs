//! # DocQA Chunker
//!
//! Deterministic sliding-window chunking of document text for embedding.
//!
//! ## Philosophy
//!
//! The chunker produces overlapping fragments that:
//! - Cover the whole text in document order
//! - Share `chunk_overlap` characters with their neighbours so sentences cut
//!   at a window edge remain retrievable
//! - Depend on nothing but `(text, chunk_size, chunk_overlap)`
//!
//! ## Architecture
//!
//! ```text
//! Extracted text
//!     │
//!     ├──> clean_text (NFKC, lowercase, strip URLs/e-mails/markup, collapse whitespace)
//!     │
//!     └──> Chunker
//!          ├─> Validate stride (chunk_size - chunk_overlap > 0)
//!          ├─> Slide a window over Unicode scalar values
//!          └─> Emit TextChunk[] in document order
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docqa_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(20, 5)).unwrap();
//!
//! let chunks = chunker.chunk_str("The cat sat. The dog ran. Birds fly south.");
//! for chunk in chunks {
//!     println!("Chunk {} at {}: {}", chunk.index, chunk.start, chunk.content);
//! }
//! ```

mod chunker;
mod cleaning;
mod config;
mod error;
mod types;

pub use chunker::{chunk_text, Chunker, ChunkingStats};
pub use cleaning::{clean_text, detect_file_type};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::TextChunk;
