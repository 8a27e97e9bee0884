//! Network-backed collaborators.

mod openai;

pub use openai::{
    list_models, ChatGenerator, OpenAiEmbedder, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    FALLBACK_CHAT_MODELS,
};
