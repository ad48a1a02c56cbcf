//! HTTP-based embedder using external LLM service

use super::{Embedder, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Embedder that uses external HTTP service (Ollama, vLLM, OpenAI, etc.)
pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
    model: String,
}

impl HttpEmbedder {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let model = config.embedding_model.clone();
        let client = super::VLLMClient::new(config)?;
        Ok(Self::new(Arc::new(client), model))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.client.embedding_dimensions()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    /// Client whose vectors encode the text length
    struct LengthClient;

    #[async_trait]
    impl LLMClient for LengthClient {
        async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok(String::new())
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn embedding_dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "chat-model"
        }
    }

    #[tokio::test]
    async fn test_reports_embedding_model_not_chat_model() {
        let embedder = HttpEmbedder::new(Arc::new(LengthClient), "mxbai-embed-large");
        assert_eq!(embedder.model_name(), "mxbai-embed-large");
        assert_eq!(embedder.dimensions(), 2);

        let batch = embedder
            .embed_batch(&["Great mouse".to_string(), "Bad".to_string()])
            .await
            .unwrap();
        assert_eq!(batch, vec![vec![11.0, 1.0], vec![3.0, 1.0]]);
    }
}
