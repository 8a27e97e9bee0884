use serde::{Deserialize, Serialize};

/// A window of source text produced by the chunker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the emission sequence (0-indexed)
    pub index: usize,

    /// Start offset in characters from the beginning of the text
    pub start: usize,

    /// The chunk text
    pub content: String,
}

impl TextChunk {
    /// Create a new text chunk
    #[must_use]
    pub const fn new(index: usize, start: usize, content: String) -> Self {
        Self {
            index,
            start,
            content,
        }
    }

    /// Length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// End offset in characters (exclusive)
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.char_len()
    }

    /// Check if chunk covers a character offset
    #[must_use]
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }
}

impl From<TextChunk> for String {
    fn from(chunk: TextChunk) -> Self {
        chunk.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_bounds() {
        let chunk = TextChunk::new(2, 10, "héllo".to_string());
        assert_eq!(chunk.char_len(), 5);
        assert_eq!(chunk.end(), 15);
        assert!(chunk.contains_offset(10));
        assert!(chunk.contains_offset(14));
        assert!(!chunk.contains_offset(9));
        assert!(!chunk.contains_offset(15));
    }

    #[test]
    fn test_into_string() {
        let chunk = TextChunk::new(0, 0, "abc".to_string());
        let text: String = chunk.into();
        assert_eq!(text, "abc");
    }
}
