use crate::config::{AppConfig, BackendMode};
use anyhow::{Context, Result};
use docqa_query::{
    ChatGenerator, Embedder, ExtractiveGenerator, Generator, HashEmbedder, OpenAiEmbedder,
};
use std::sync::Arc;

pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let dimension = config.store.dimension;
    match config.provider.embedding_mode {
        BackendMode::Stub => {
            log::debug!("Using stub embedder (dim {dimension})");
            Ok(Arc::new(HashEmbedder::new(dimension)))
        }
        BackendMode::Http => {
            let provider = &config.provider;
            let embedder = OpenAiEmbedder::new(
                &provider.require_api_key()?,
                provider.embedding_base_url(),
                &provider.embedding_model,
                dimension,
                config.query.embed_timeout(),
                provider.max_retries,
            )
            .context("Failed to configure embedding client")?
            .with_request_dimensions(provider.embedding_dimensions);
            log::debug!(
                "Using {} embeddings from {}",
                provider.embedding_model,
                provider.embedding_base_url()
            );
            Ok(Arc::new(embedder))
        }
    }
}

pub fn build_generator(config: &AppConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.generation_mode {
        BackendMode::Stub => {
            log::debug!("Using extractive stub generator");
            Ok(Arc::new(ExtractiveGenerator))
        }
        BackendMode::Http => {
            let provider = &config.provider;
            let generator = ChatGenerator::new(
                &provider.require_api_key()?,
                &provider.base_url,
                &provider.chat_model,
                config.query.generate_timeout(),
            )
            .context("Failed to configure chat client")?
            .with_sampling(provider.temperature, provider.max_tokens);
            log::debug!("Using chat model {}", generator.model());
            Ok(Arc::new(generator))
        }
    }
}
