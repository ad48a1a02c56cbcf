//! LLM integration
//!
//! Provides traits and implementations for:
//! - Text generation via external services (Ollama, vLLM, OpenAI, etc.)
//! - Embedding generation for the review index
//! - Cleanup of reasoning-model output

mod cache;
mod client;
mod http_embedder;
mod http_generator;
mod thinking;
mod traits;

pub use client::{ChatMessage, LLMClient, VLLMClient};
pub use http_embedder::HttpEmbedder;
pub use http_generator::HttpGenerator;
pub use thinking::{strip_thinking, THINK_END_MARKER};
pub use traits::*;
