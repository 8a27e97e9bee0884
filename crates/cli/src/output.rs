//! Command results, printed as text or as JSON with `--json`.

use docqa_chunker::ChunkingStats;
use docqa_vector_store::SearchHit;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: Vec<String>,
    /// Chunks in the store after this run
    pub total_chunks: usize,
    pub store_dir: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub store_dir: String,
    pub dimension: usize,
    pub chunks: usize,
    pub persisted: bool,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl StatsOutput {
    pub fn new(store_dir: String, dimension: usize, persisted: bool, stats: &ChunkingStats) -> Self {
        Self {
            store_dir,
            dimension,
            chunks: stats.total_chunks,
            persisted,
            total_chars: stats.total_chars,
            avg_chars_per_chunk: stats.avg_chars_per_chunk,
            min_chars: stats.min_chars,
            max_chars: stats.max_chars,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsOutput {
    pub base_url: String,
    pub models: Vec<String>,
}

pub trait Render {
    fn render_text(&self) -> String;
}

impl Render for IngestOutput {
    fn render_text(&self) -> String {
        let mut out = format!(
            "Ingested {} documents ({} chunks) into {}\nStore now holds {} chunks",
            self.documents, self.chunks, self.store_dir, self.total_chunks
        );
        for path in &self.skipped {
            let _ = write!(out, "\nSkipped: {path}");
        }
        out
    }
}

impl Render for SearchOutput {
    fn render_text(&self) -> String {
        if self.hits.is_empty() {
            return "No results".to_string();
        }
        let mut out = String::new();
        for (i, hit) in self.hits.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            let _ = write!(
                out,
                "{}. (score: {:.3}, chunk #{})\n   {}",
                i + 1,
                hit.score,
                hit.position,
                hit.payload
            );
        }
        out
    }
}

impl Render for AskOutput {
    fn render_text(&self) -> String {
        self.answer.clone()
    }
}

impl Render for StatsOutput {
    fn render_text(&self) -> String {
        format!(
            "Store: {}{}\nDimension: {}\nChunks: {}\nCharacters: {} (avg {}, min {}, max {})",
            self.store_dir,
            if self.persisted { "" } else { " (not saved)" },
            self.dimension,
            self.chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}

impl Render for ModelsOutput {
    fn render_text(&self) -> String {
        self.models.join("\n")
    }
}
