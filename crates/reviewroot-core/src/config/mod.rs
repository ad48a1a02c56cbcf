//! Configuration management

use crate::error::{Result, ReviewRootError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for the number of reviews requested from the index
pub const MAX_K: usize = 50;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Retrieval and keyword extraction tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Review corpus and vector index locations
    #[serde(default)]
    pub index: IndexConfig,

    /// Per-call timeouts for the tool protocol client
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("REVIEWROOT_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("REVIEWROOT_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("REVIEWROOT_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("REVIEWROOT_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("REVIEWROOT_LLM_MODEL").unwrap_or_else(|_| "llama3.2:latest".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("REVIEWROOT_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "mxbai-embed-large".to_string())
}

fn default_timeout() -> u64 {
    120
}

/// Retrieval configuration
///
/// `min_similarity` of 0 accepts every document the index returns for the
/// requested `k`; anything higher drops weakly related reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of reviews retrieved when the caller does not say
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Minimum similarity (1 - cosine distance) a review must reach
    #[serde(default)]
    pub min_similarity: f64,

    /// Maximum number of keywords kept from the LLM response
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

fn default_k() -> usize {
    5
}

fn default_max_keywords() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            min_similarity: 0.0,
            max_keywords: default_max_keywords(),
        }
    }
}

/// Review corpus and index storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// CSV file with `Title, Date, Rating, Review` columns
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// SQLite file holding reviews and their embeddings
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Collection name stored alongside each review
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_csv_path() -> PathBuf {
    std::env::var("REVIEWROOT_CSV")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reviews.csv"))
}

fn default_db_path() -> PathBuf {
    std::env::var("REVIEWROOT_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("reviews.sqlite")
        })
}

fn default_collection() -> String {
    "gaming_reviews".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            db_path: default_db_path(),
            collection: default_collection(),
        }
    }
}

/// Per-call timeouts, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Single-step tools, `initialize` and `tools/list`
    #[serde(default = "default_tool_secs")]
    pub tool_secs: u64,

    /// The composite `agent` tool
    #[serde(default = "default_agent_secs")]
    pub agent_secs: u64,
}

fn default_tool_secs() -> u64 {
    10
}

fn default_agent_secs() -> u64 {
    60
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            tool_secs: default_tool_secs(),
            agent_secs: default_agent_secs(),
        }
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        let min = self.retrieval.min_similarity;
        if !(0.0..=1.0).contains(&min) {
            return Err(ReviewRootError::Config(format!(
                "retrieval.min_similarity must be within [0, 1], got {}",
                min
            )));
        }
        if self.retrieval.max_keywords == 0 {
            return Err(ReviewRootError::Config(
                "retrieval.max_keywords must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Clamp a requested review count into `[1, MAX_K]`
pub fn clamp_k(k: i64) -> usize {
    k.clamp(1, MAX_K as i64) as usize
}
