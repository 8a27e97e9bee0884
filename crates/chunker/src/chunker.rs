use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::types::TextChunk;
use std::path::Path;

/// Main chunker interface for splitting text into overlapping windows
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting configurations with a non-positive stride
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk text from a string.
    ///
    /// Windows start at offset 0 and advance by `chunk_size - chunk_overlap`
    /// characters. Each window spans up to `chunk_size` characters; emission
    /// stops with the first window that reaches the end of the text, so no
    /// window is a suffix of its predecessor.
    #[must_use]
    pub fn chunk_str(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus the end of the text, so windows can
        // be sliced on char boundaries.
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total = offsets.len();
        offsets.push(text.len());

        let size = self.config.chunk_size;
        let stride = self.config.stride();

        let mut chunks = Vec::with_capacity(total.div_ceil(stride));
        let mut start = 0;
        while start < total {
            let end = (start + size).min(total);
            let content = &text[offsets[start]..offsets[end]];
            chunks.push(TextChunk::new(chunks.len(), start, content.to_string()));
            if end == total {
                break;
            }
            start += stride;
        }

        log::debug!(
            "Chunked {} chars into {} windows (size {}, overlap {})",
            total,
            chunks.len(),
            size,
            self.config.chunk_overlap
        );
        chunks
    }

    /// Chunk text from a UTF-8 file
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<Vec<TextChunk>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(self.chunk_str(&content))
    }

    /// Get chunking statistics
    #[must_use]
    pub fn get_stats(chunks: &[TextChunk]) -> ChunkingStats {
        let lengths: Vec<usize> = chunks.iter().map(TextChunk::char_len).collect();
        let total_chars: usize = lengths.iter().sum();
        ChunkingStats {
            total_chunks: chunks.len(),
            total_chars,
            avg_chars_per_chunk: if chunks.is_empty() {
                0
            } else {
                total_chars / chunks.len()
            },
            min_chars: lengths.iter().copied().min().unwrap_or(0),
            max_chars: lengths.iter().copied().max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

/// Split `text` into overlapping windows of up to `size` characters.
///
/// Returns `InvalidConfig` when `size == 0` or `overlap >= size`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    let chunker = Chunker::new(ChunkerConfig::new(size, overlap))?;
    Ok(chunker
        .chunk_str(text)
        .into_iter()
        .map(String::from)
        .collect())
}

/// Statistics about chunking results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}
