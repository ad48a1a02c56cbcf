//! HTTP client for external LLM services (Ollama, vLLM, OpenAI, etc.)

use crate::config::LLMServiceConfig;
use crate::error::{Result, ReviewRootError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate embeddings for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible client (Ollama exposes the same `/v1` routes)
pub struct VLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: usize,
    cache: Arc<super::cache::LLMCache>,
}

impl VLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReviewRootError::Http)?;

        // mxbai-embed-large produces 1024-dimensional vectors
        let embedding_dimensions = config.embedding_dimensions.unwrap_or(1024);

        Ok(Self {
            http_client,
            config,
            embedding_dimensions,
            cache: Arc::new(super::cache::LLMCache::new()),
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }
}

#[async_trait]
impl LLMClient for VLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();

        let messages_json = serde_json::to_string(&messages)?;
        let cache_key = super::cache::chat_cache_key(&self.config.model, &messages_json);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("Cache hit for chat completion");
            return Ok(cached);
        }


        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.7,
            max_tokens: 1024,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let req = self.authorize(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(ReviewRootError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewRootError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(ReviewRootError::Http)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReviewRootError::Llm("No response from LLM".to_string()))?
            .message
            .content;

        self.cache.set(cache_key, content.clone())?;
        tracing::debug!(
            "Chat completion from {} took {}ms",
            self.config.model,
            start.elapsed().as_millis()
        );

        Ok(content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| ReviewRootError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cache_key = super::cache::embedding_cache_key(&self.config.embedding_model, text);
            if let Some(cached) = self.cache.get(&cache_key) {
                if let Ok(embedding) = serde_json::from_str::<Vec<f32>>(&cached) {
                    results.push(Some(embedding));
                            continue;
                }
            }
            results.push(None);
            uncached_texts.push(text.clone());
            uncached_indices.push(i);
        }

        if !uncached_texts.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - uncached_texts.len(),
                uncached_texts.len()
            );

            #[derive(Serialize)]
            struct EmbedRequest {
                model: String,
                input: Vec<String>,
            }

            #[derive(Deserialize)]
            struct EmbedResponse {
                data: Vec<EmbedData>,
            }

            #[derive(Deserialize)]
            struct EmbedData {
                embedding: Vec<f32>,
            }

            let request = EmbedRequest {
                model: self.config.embedding_model.clone(),
                input: uncached_texts.clone(),
            };

            let url = format!("{}/v1/embeddings", self.config.embeddings_url());
            let req = self.authorize(self.http_client.post(&url).json(&request));

            let response = req.send().await.map_err(ReviewRootError::Http)?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ReviewRootError::ExternalError(format!(
                    "Embedding service error (HTTP {}): {}",
                    status, body
                )));
            }

            let embed_response: EmbedResponse = response.json().await.map_err(ReviewRootError::Http)?;

            if embed_response.data.len() != uncached_texts.len() {
                return Err(ReviewRootError::Llm(format!(
                    "Expected {} embeddings, got {}",
                    uncached_texts.len(),
                    embed_response.data.len()
                )));
            }

            for (i, embedding) in embed_response.data.into_iter().enumerate() {
                let cache_key = super::cache::embedding_cache_key(
                    &self.config.embedding_model,
                    &uncached_texts[i],
                );
                if let Ok(json) = serde_json::to_string(&embedding.embedding) {
                    self.cache.set(cache_key, json)?;
                }
                results[uncached_indices[i]] = Some(embedding.embedding);
            }
        } else {
            tracing::debug!("All {} embeddings from cache", texts.len());
        }

        tracing::debug!(
            "Embedded {} texts in {}ms",
            texts.len(),
            start.elapsed().as_millis()
        );

        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ReviewRootError::Llm("Incomplete embedding batch".to_string()))
    }

    fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
