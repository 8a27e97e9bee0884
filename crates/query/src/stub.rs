//! Deterministic offline collaborators.
//!
//! `HashEmbedder` hashes word tokens into signed buckets, so texts sharing
//! words get similar vectors without any model download. `ExtractiveGenerator`
//! answers with the best-ranked passage of the supplied context.

use crate::collaborators::{Embedder, Generator};
use crate::context::CONTEXT_SEPARATOR;
use crate::prompt::{CONTEXT_HEADER, QUESTION_HEADER};
use async_trait::async_trait;
use docqa_vector_store::normalized;

pub const DEFAULT_STUB_DIMENSION: usize = 384;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Embed a single text; the zero vector when it has no word tokens
    #[must_use]
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return vec;
        }
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut state = fnv1a_64(token.to_lowercase().as_bytes());
            let bucket = (splitmix64(&mut state) % self.dimension as u64) as usize;
            let sign = if splitmix64(&mut state) >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }
        normalized(&vec)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_STUB_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Offline generator that quotes the first context passage.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveGenerator;

#[async_trait]
impl Generator for ExtractiveGenerator {
    async fn generate(&self, _system: &str, user: &str) -> anyhow::Result<String> {
        let body = user
            .split_once(CONTEXT_HEADER)
            .map_or(user, |(_, rest)| rest);
        let context = body
            .rsplit_once(QUESTION_HEADER)
            .map_or(body, |(ctx, _)| ctx);
        let passage = context
            .split(CONTEXT_SEPARATOR)
            .map(str::trim)
            .find(|p| !p.is_empty())
            .unwrap_or_default();
        if passage.is_empty() {
            anyhow::bail!("no context passage to quote");
        }
        Ok(format!("According to the documents: {passage}"))
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_user_prompt;
    use docqa_vector_store::dot;

    #[tokio::test]
    async fn hash_embedder_is_deterministic_and_unit_length() {
        let embedder = HashEmbedder::new(64);
        let texts = vec!["The dog ran.".to_string(), "the DOG ran".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 64);
        assert_eq!(vectors[0], vectors[1]);
        assert!((dot(&vectors[0], &vectors[0]) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hash_embedder_maps_punctuation_to_zero() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.embed_one("... !!"), vec![0.0; 8]);
        assert!(HashEmbedder::new(0).embed_one("word").is_empty());
    }

    #[tokio::test]
    async fn extractive_generator_quotes_first_passage() {
        let context = format!("first passage{CONTEXT_SEPARATOR}second passage");
        let user = build_user_prompt("what?", &context);
        let answer = ExtractiveGenerator.generate("sys", &user).await.unwrap();
        assert_eq!(answer, "According to the documents: first passage");
    }

    #[tokio::test]
    async fn extractive_generator_fails_without_context() {
        let user = build_user_prompt("what?", "");
        assert!(ExtractiveGenerator.generate("sys", &user).await.is_err());
    }
}
