use docqa_chunker::{clean_text, Chunker, ChunkerConfig, TextChunk};

fn chunk(text: &str, size: usize, overlap: usize) -> Vec<TextChunk> {
    let chunker = Chunker::new(ChunkerConfig::new(size, overlap)).expect("valid config");
    chunker.chunk_str(text)
}

#[test]
fn cleaned_document_chunks_cover_text_in_order() {
    let raw = "Chapter 1\n\nThe   MITOCHONDRIA is the powerhouse of the cell.\n\
               See https://bio.example.com for more.\n\nChapter 2\n\nPhotosynthesis happens in chloroplasts.";
    let text = clean_text(raw);
    assert!(!text.contains("https"));

    let chunks = chunk(&text, 40, 10);
    assert!(chunks.len() > 1);

    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.index, i);
        assert_eq!(c.start, i * 30);
        let expected: String = text.chars().skip(c.start).take(40).collect();
        assert_eq!(c.content, expected);
    }

    let last = chunks.last().expect("at least one chunk");
    assert_eq!(last.end(), text.chars().count());
}

#[test]
fn default_config_keeps_short_documents_whole() {
    let text = clean_text("A short   note.");
    let chunks = Chunker::default().chunk_str(&text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "a short note.");
}
