use crate::collaborators::{DocumentExtractor, Embedder};
use crate::engine::{with_timeout, QueryConfig};
use crate::error::{QueryError, Result};
use docqa_chunker::{clean_text, Chunker};
use docqa_vector_store::VectorIndex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents that contributed at least one chunk
    pub documents: usize,
    /// Documents that could not be extracted or were empty after cleaning
    pub skipped: Vec<PathBuf>,
    /// Chunks embedded and added to the index
    pub chunks: usize,
}

/// Extract → clean → chunk → embed → add.
///
/// Unreadable or empty documents are skipped. Embedding failures abort the
/// run before anything is added, so the index either gains every chunk or
/// none. Saving stays with the caller.
pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn DocumentExtractor>,
    config: QueryConfig,
}

impl Ingestor {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn Embedder>,
        extractor: Arc<dyn DocumentExtractor>,
        config: QueryConfig,
    ) -> Self {
        Self {
            chunker,
            embedder,
            extractor,
            config,
        }
    }

    /// Chunks for every extractable document, in input order
    pub fn collect_chunks(&self, paths: &[PathBuf]) -> (Vec<String>, IngestReport) {
        let mut chunks = Vec::new();
        let mut report = IngestReport::default();

        for path in paths {
            let Some(raw) = self.extractor.extract(path) else {
                log::warn!("Skipping {}: extraction failed", path.display());
                report.skipped.push(path.clone());
                continue;
            };
            let text = clean_text(&raw);
            if text.is_empty() {
                log::warn!("Skipping {}: no text after cleaning", path.display());
                report.skipped.push(path.clone());
                continue;
            }
            let doc_chunks = self.chunker.chunk_str(&text);
            log::info!("{}: {} chunks", path.display(), doc_chunks.len());
            report.documents += 1;
            chunks.extend(doc_chunks.into_iter().map(String::from));
        }

        (chunks, report)
    }

    pub async fn ingest_paths(
        &self,
        paths: &[PathBuf],
        index: &mut VectorIndex,
    ) -> Result<IngestReport> {
        self.ingest_paths_with_progress(paths, index, |_, _| {}).await
    }

    /// Like `ingest_paths`, calling `on_batch(embedded, total)` after each
    /// embedder batch.
    pub async fn ingest_paths_with_progress(
        &self,
        paths: &[PathBuf],
        index: &mut VectorIndex,
        on_batch: impl FnMut(usize, usize),
    ) -> Result<IngestReport> {
        let (chunks, mut report) = self.collect_chunks(paths);
        report.chunks = self.index_chunks(&chunks, index, on_batch).await?;
        Ok(report)
    }

    /// Embed `chunks` in batches and add them to `index` in one step.
    pub async fn index_chunks(
        &self,
        chunks: &[String],
        index: &mut VectorIndex,
        mut on_batch: impl FnMut(usize, usize),
    ) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        log::info!("Generating embeddings for {} chunks...", chunks.len());
        let batch_size = self.config.embed_batch_size.max(1);
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let embedded = with_timeout(
                "chunk embedding",
                self.config.embed_timeout(),
                self.embedder.embed(batch),
            )
            .await?
            .map_err(|e| QueryError::EmbeddingError(format!("{e:#}")))?;
            if embedded.len() != batch.len() {
                return Err(QueryError::EmbeddingError(format!(
                    "embedder returned {} vectors for {} chunks",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
            on_batch(vectors.len(), chunks.len());
        }

        index.add(&vectors, chunks)?;
        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PlainTextExtractor;
    use crate::stub::HashEmbedder;
    use async_trait::async_trait;
    use docqa_chunker::ChunkerConfig;
    use pretty_assertions::assert_eq;

    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0; 8]).collect())
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    fn ingestor(embedder: Arc<dyn Embedder>, batch: usize) -> Ingestor {
        Ingestor::new(
            Chunker::new(ChunkerConfig::new(20, 5)).unwrap(),
            embedder,
            Arc::new(PlainTextExtractor),
            QueryConfig {
                embed_batch_size: batch,
                ..QueryConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn ingests_documents_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "The cat sat. The dog ran. Birds fly south.").unwrap();
        let blank = dir.path().join("blank.md");
        std::fs::write(&blank, "  <p></p>  ").unwrap();
        let slides = dir.path().join("slides.pptx");
        std::fs::write(&slides, b"PK").unwrap();

        let mut index = VectorIndex::in_memory(8).unwrap();
        let mut progress = Vec::new();
        let report = ingestor(Arc::new(HashEmbedder::new(8)), 2)
            .ingest_paths_with_progress(
                &[notes, blank.clone(), slides.clone()],
                &mut index,
                |done, total| progress.push((done, total)),
            )
            .await
            .unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.skipped, vec![blank, slides]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.payload(0), Some("the cat sat. the dog"));
        assert_eq!(progress, vec![(2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn short_embedder_batch_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "The cat sat. The dog ran. Birds fly south.").unwrap();

        let mut index = VectorIndex::in_memory(8).unwrap();
        let result = ingestor(Arc::new(ShortEmbedder), 32)
            .ingest_paths(&[notes], &mut index)
            .await;

        assert!(matches!(result, Err(QueryError::EmbeddingError(_))));
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn nothing_to_ingest_is_not_an_error() {
        let mut index = VectorIndex::in_memory(8).unwrap();
        let report = ingestor(Arc::new(HashEmbedder::new(8)), 4)
            .ingest_paths(&[], &mut index)
            .await
            .unwrap();
        assert_eq!(report, IngestReport::default());
    }
}
