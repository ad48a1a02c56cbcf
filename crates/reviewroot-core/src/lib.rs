//! Reviewroot Core Library
//!
//! Retrieval-augmented question answering over a corpus of product reviews.
//!
//! # Features
//! - Review index: CSV corpus embedded into SQLite, cosine nearest-neighbor search
//! - Keyword extraction, similarity-filtered retrieval, summarization, statistics
//! - Fixed-sequence pipeline behind a typed tool boundary
//! - OpenAI-compatible LLM client with response caching

pub mod config;
pub mod context;
pub mod error;
pub mod index;
pub mod llm;
pub mod tools;

pub use config::{Config, IndexConfig, LLMServiceConfig, RetrievalConfig, TimeoutConfig};
pub use context::AppContext;
pub use error::{Error, Result, ReviewRootError};
pub use index::{init_index, Document, IndexBuildReport, ReviewIndex, ReviewStore, Retriever};
pub use llm::{
    strip_thinking, ChatMessage, Embedder, Generator, HttpEmbedder, HttpGenerator, LLMClient,
    VLLMClient,
};
pub use tools::{
    answer_question, Entry, EntryList, Orchestrator, PipelineResult, PipelineStatus,
    ReviewRecord, ReviewTools, ToolCall, ToolOutput,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "reviewroot";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "reviewroot";
