//! OpenAI-compatible HTTP collaborators (OpenAI, Groq, local gateways).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::collaborators::{Embedder, Generator};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 1500;

/// Offered when the provider cannot list its models.
pub const FALLBACK_CHAT_MODELS: &[&str] = &[
    "llama3-8b-8192",
    "llama3-70b-8192",
    "gemma2-9b-it",
    "mixtral-8x7b-32768",
];

/// Model ids containing any of these are not chat models.
const NON_CHAT_MARKERS: &[&str] = &["whisper", "tts", "guard"];

fn build_client(api_key: &str, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", api_key.trim());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth).context("invalid API key")?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

/// Async embeddings client for `POST {base}/embeddings`.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    /// Sent as `dimensions`; only some providers accept the field
    request_dimensions: Option<usize>,
    max_retries: usize,
}

impl OpenAiEmbedder {
    /// `budget` bounds one `embed` call including retries and backoff; each
    /// HTTP attempt gets a share of it.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimension: usize,
        budget: Duration,
        max_retries: usize,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(dimension > 0, "embedding dimension must be > 0");
        let max_retries = max_retries.max(1);
        Ok(Self {
            client: build_client(api_key, attempt_timeout(budget, max_retries))?,
            endpoint: endpoint(base_url, "embeddings"),
            model: model.to_string(),
            dimension,
            request_dimensions: None,
            max_retries,
        })
    }

    /// Ask the provider for `dimensions`-long vectors (OpenAI `text-embedding-3-*`).
    #[must_use]
    pub fn with_request_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.request_dimensions = dimensions;
        self
    }

    fn request<'a>(&'a self, texts: &'a [String]) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        }
    }

    fn should_retry(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn retry_backoff(attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        Duration::from_millis(500 * (1 << capped))
    }
}

const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-request timeout that lets `attempts` requests and the backoff sleeps
/// between them fit inside `budget`.
fn attempt_timeout(budget: Duration, attempts: usize) -> Duration {
    let attempts = attempts.max(1);
    let backoff: Duration = (1..attempts).map(OpenAiEmbedder::retry_backoff).sum();
    let share = budget.saturating_sub(backoff) / attempts as u32;
    share.max(MIN_ATTEMPT_TIMEOUT).min(budget)
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = self.request(texts);
        let mut attempt = 0usize;
        loop {
            let resp = match self.client.post(&self.endpoint).json(&request).send().await {
                Ok(resp) => resp,
                Err(err)
                    if (err.is_timeout() || err.is_connect()) && attempt + 1 < self.max_retries =>
                {
                    attempt += 1;
                    log::debug!("Embedding request failed ({err}), retry {attempt}");
                    tokio::time::sleep(Self::retry_backoff(attempt)).await;
                    continue;
                }
                Err(err) => return Err(err).context("embeddings request failed"),
            };

            let status = resp.status();
            if status.is_success() {
                let mut parsed: EmbeddingResponse = resp
                    .json()
                    .await
                    .context("failed to parse embedding response")?;
                return into_vectors(&mut parsed, texts.len());
            }

            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            if Self::should_retry(status) && attempt + 1 < self.max_retries {
                attempt += 1;
                log::debug!("Embedding request returned {status}, retry {attempt}");
                tokio::time::sleep(Self::retry_backoff(attempt)).await;
                continue;
            }
            anyhow::bail!("embeddings request failed ({status}): {body}");
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn into_vectors(parsed: &mut EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    parsed.data.sort_by_key(|entry| entry.index);
    anyhow::ensure!(
        parsed.data.len() == expected,
        "provider returned {} embeddings for {} inputs",
        parsed.data.len(),
        expected
    );
    Ok(parsed
        .data
        .drain(..)
        .map(|entry| entry.embedding)
        .collect())
}

/// Chat completions client for `POST {base}/chat/completions`.
#[derive(Clone)]
pub struct ChatGenerator {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl ChatGenerator {
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing chat model name");
        Ok(Self {
            client: build_client(api_key, timeout)?,
            endpoint: endpoint(base_url, "chat/completions"),
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    #[must_use]
    pub fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("failed to call chat completions")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("chat completions returned {status}: {text}");
        }
        let parsed: ChatResponse = resp
            .json()
            .await
            .context("failed to parse chat response")?;
        first_answer(parsed)
    }
}

fn first_answer(parsed: ChatResponse) -> Result<String> {
    parsed
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .context("chat response contained no answer")
}

/// Chat-capable models offered by the provider at `base_url`.
///
/// Never fails: a missing key, a transport error or an empty listing all
/// yield [`FALLBACK_CHAT_MODELS`].
pub async fn list_models(base_url: &str, api_key: &str) -> Vec<String> {
    let fallback = || -> Vec<String> {
        FALLBACK_CHAT_MODELS.iter().map(|m| (*m).to_string()).collect()
    };
    if api_key.trim().is_empty() {
        log::warn!("No API key configured; using default model list");
        return fallback();
    }

    match fetch_model_ids(base_url, api_key).await {
        Ok(ids) => {
            let models = chat_models(ids);
            if models.is_empty() {
                log::warn!("Provider listed no chat models; using default model list");
                fallback()
            } else {
                models
            }
        }
        Err(err) => {
            log::warn!("Could not fetch models: {err:#}");
            fallback()
        }
    }
}

async fn fetch_model_ids(base_url: &str, api_key: &str) -> Result<Vec<String>> {
    let client = build_client(api_key, Duration::from_secs(15))?;
    let resp = client
        .get(endpoint(base_url, "models"))
        .send()
        .await
        .context("failed to list models")?
        .error_for_status()
        .context("model listing rejected")?;
    let parsed: ModelList = resp.json().await.context("failed to parse model list")?;
    Ok(parsed.data.into_iter().map(|m| m.id).collect())
}

/// Drop speech, TTS and guard models; sort for stable display.
fn chat_models(ids: Vec<String>) -> Vec<String> {
    let mut models: Vec<String> = ids
        .into_iter()
        .filter(|id| {
            let lower = id.to_lowercase();
            !NON_CHAT_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .collect();
    models.sort();
    models.dedup();
    models
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoints_ignore_trailing_slash() {
        assert_eq!(
            endpoint("https://api.groq.com/openai/v1/", "embeddings"),
            "https://api.groq.com/openai/v1/embeddings"
        );
        assert_eq!(
            endpoint("http://localhost:8080/v1", "chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn embedding_response_is_reordered_by_index() {
        let mut parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#,
        )
        .unwrap();
        let vectors = into_vectors(&mut parsed, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn embedding_count_mismatch_is_an_error() {
        let mut parsed: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0],"index":0}]}"#).unwrap();
        assert!(into_vectors(&mut parsed, 2).is_err());
    }

    #[test]
    fn chat_answer_takes_first_choice_with_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null}},{"message":{"content":"Birds fly south."}}]}"#,
        )
        .unwrap();
        assert_eq!(first_answer(parsed).unwrap(), "Birds fly south.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_answer(empty).is_err());
    }

    #[test]
    fn chat_models_drop_speech_and_guard_models() {
        let ids = vec![
            "whisper-large-v3".to_string(),
            "llama3-8b-8192".to_string(),
            "playai-tts".to_string(),
            "llama-guard-3-8b".to_string(),
            "gemma2-9b-it".to_string(),
        ];
        assert_eq!(chat_models(ids), vec!["gemma2-9b-it", "llama3-8b-8192"]);
    }

    #[test]
    fn embedding_request_sends_dimensions_only_when_configured() {
        let texts = vec!["birds fly south".to_string()];
        let budget = Duration::from_secs(30);
        let embedder =
            OpenAiEmbedder::new("k", "http://localhost", "all-MiniLM-L6-v2", 384, budget, 3).unwrap();
        assert_eq!(
            serde_json::to_value(embedder.request(&texts)).unwrap(),
            serde_json::json!({"model": "all-MiniLM-L6-v2", "input": ["birds fly south"]})
        );

        let embedder = embedder.with_request_dimensions(Some(256));
        assert_eq!(
            serde_json::to_value(embedder.request(&texts)).unwrap(),
            serde_json::json!({
                "model": "all-MiniLM-L6-v2",
                "input": ["birds fly south"],
                "dimensions": 256
            })
        );
    }

    #[test]
    fn attempts_and_backoff_fit_inside_the_budget() {
        let budget = Duration::from_secs(30);
        // backoff before retries 1 and 2: 1s + 2s
        assert_eq!(attempt_timeout(budget, 3), Duration::from_secs(9));
        assert!(attempt_timeout(budget, 3) * 3 + Duration::from_secs(3) <= budget);
        assert_eq!(attempt_timeout(budget, 1), budget);
        assert_eq!(attempt_timeout(budget, 0), budget);
        assert_eq!(attempt_timeout(Duration::from_secs(2), 3), Duration::from_secs(1));
        assert_eq!(
            attempt_timeout(Duration::from_millis(500), 3),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn constructors_reject_missing_credentials() {
        let timeout = Duration::from_secs(5);
        assert!(OpenAiEmbedder::new(" ", "http://localhost", "m", 8, timeout, 3).is_err());
        assert!(OpenAiEmbedder::new("k", "http://localhost", "m", 0, timeout, 3).is_err());
        assert!(ChatGenerator::new("k", "http://localhost", "", timeout).is_err());

        let chat = ChatGenerator::new("k", "http://localhost", "llama3-8b-8192", timeout).unwrap();
        assert_eq!(chat.model(), "llama3-8b-8192");
    }

    #[tokio::test]
    async fn model_listing_falls_back_without_key_or_server() {
        assert_eq!(list_models("http://127.0.0.1:9", "").await, FALLBACK_CHAT_MODELS);
        assert_eq!(
            list_models("http://127.0.0.1:9", "key").await,
            FALLBACK_CHAT_MODELS
        );
    }
}
