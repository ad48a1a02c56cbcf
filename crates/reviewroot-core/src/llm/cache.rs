//! In-memory TTL cache for LLM responses
//!
//! Identical prompts are common in practice (the console re-runs `process`
//! on the same keywords), so chat completions and embeddings are memoized.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

/// Entry count at which expired entries are swept on insert
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: SystemTime,
}

/// In-memory cache for LLM responses
pub struct LLMCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl LLMCache {
    /// Create new cache with default TTL of 1 hour
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Create cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: ttl,
        }
    }

    /// Get cached value if it exists and has not expired
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Set cached value with the default TTL
    pub fn set(&self, key: String, value: String) -> Result<()> {
        let expires_at = SystemTime::now() + self.default_ttl;

        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= SWEEP_THRESHOLD {
                let now = SystemTime::now();
                entries.retain(|_, entry| now < entry.expires_at);
            }
            entries.insert(key, CacheEntry { value, expires_at });
        }

        Ok(())
    }
}

impl Default for LLMCache {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(model: &str, payload: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(model.as_bytes());
    hasher.update(&[0]);
    hasher.update(payload.as_bytes());
    hasher.finalize().to_hex()[..16].to_string()
}

/// Generate cache key for embeddings
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    format!("embed:{}:{}", model, digest(model, text))
}

/// Generate cache key for chat completions
pub fn chat_cache_key(model: &str, messages: &str) -> String {
    format!("chat:{}:{}", model, digest(model, messages))
}
