//! Text generator backed by an external chat-completion service

use super::{ChatMessage, Generator, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Generator that sends each prompt as a single user message
pub struct HttpGenerator {
    client: Arc<dyn LLMClient>,
}

impl HttpGenerator {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let client = super::VLLMClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .chat_completion(vec![ChatMessage::user(prompt)])
            .await
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
