//! OpenAI API client and provider implementations

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::LlmProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// HTTP client for the OpenAI embeddings and chat completions APIs
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self { client, config })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}: {}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            delay,
                            e
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("Request failed after retries")))
    }

    /// Generate embeddings for a batch of texts, preserving input order
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
        };

        self.retry_request(|| async {
            let response = self
                .client
                .post(format!("{}/embeddings", self.config.base_url))
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::embedding(format!(
                    "Embeddings API returned {}: {}",
                    status, body
                )));
            }

            let parsed: EmbeddingsResponse = response.json().await?;
            if parsed.data.len() != request.input.len() {
                return Err(Error::embedding(format!(
                    "Embeddings API returned {} vectors for {} inputs",
                    parsed.data.len(),
                    request.input.len()
                )));
            }

            let mut data = parsed.data;
            data.sort_by_key(|d| d.index);
            Ok(data.into_iter().map(|d| d.embedding).collect())
        })
        .await
    }

    /// Generate a chat completion for a single user prompt
    pub async fn chat(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
        };

        self.retry_request(|| async {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.config.base_url))
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::llm(format!(
                    "Chat API returned {}: {}",
                    status, body
                )));
            }

            let parsed: ChatResponse = response.json().await?;
            parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| Error::llm("Chat API returned no choices"))
        })
        .await
    }

    /// Check if the API is reachable with the configured credential
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);
        match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.client.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("Embeddings API returned no vectors"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.client.config.embed_dimensions
    }

    fn model(&self) -> &str {
        &self.client.config.embed_model
    }

    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }
}

/// OpenAI chat completion provider
pub struct OpenAiLlm {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.client.chat(prompt, temperature).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.client.config.chat_model
    }
}

/// Combined OpenAI provider sharing one HTTP client
pub struct OpenAiProvider {
    embedder: OpenAiEmbedder,
    llm: OpenAiLlm,
}

impl OpenAiProvider {
    /// Create providers backed by a shared client
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config.clone())?);
        Ok(Self {
            embedder: OpenAiEmbedder {
                client: Arc::clone(&client),
            },
            llm: OpenAiLlm { client },
        })
    }

    /// Split into separate embedding and LLM providers
    pub fn split(self) -> (Arc<OpenAiEmbedder>, Arc<OpenAiLlm>) {
        (Arc::new(self.embedder), Arc::new(self.llm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn test_client(max_retries: u32) -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            max_retries,
            ..OpenAiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_retry_returns_first_success_without_retrying() {
        let client = test_client(2);
        let calls = AtomicUsize::new(0);

        let result = client
            .retry_request(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("body".to_string())
            })
            .await;

        assert_eq!(assert_ok!(result), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_a_failed_attempt() {
        let client = test_client(1);
        let calls = AtomicUsize::new(0);

        let result = client
            .retry_request(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::llm("transient failure"))
                } else {
                    Ok("recovered".to_string())
                }
            })
            .await;

        assert_eq!(assert_ok!(result), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_the_final_attempt() {
        let client = test_client(0);
        let calls = AtomicUsize::new(0);

        let result: Result<String> = client
            .retry_request(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::embedding("upstream unavailable"))
            })
            .await;

        // The last attempt's error surfaces, not a generic fallback.
        let error = assert_err!(result);
        assert!(matches!(error, Error::Embedding(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_embeddings_response() {
        let json = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "embedding": [0.3, 0.4], "index": 1},
                {"object": "embedding", "embedding": [0.1, 0.2], "index": 0}
            ],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;

        let mut parsed: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(parsed.data[1].embedding, vec![0.3, 0.4]);
    }

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Paris is the capital."},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 50, "completion_tokens": 6, "total_tokens": 56}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Paris is the capital.");
    }

    #[test]
    fn test_serialize_chat_request() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            temperature: 0.2,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["temperature"], 0.2);
    }
}
