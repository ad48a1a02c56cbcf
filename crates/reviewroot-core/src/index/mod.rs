//! Review vector index
//!
//! CSV loading, SQLite persistence, and nearest-neighbor search over
//! embedded reviews.

mod ann_index;
mod csv_loader;
mod review_index;
mod store;
mod vectors;

pub use ann_index::{AnnIndex, ANN_THRESHOLD};
pub use csv_loader::{csv_fingerprint, load_reviews_csv, REQUIRED_COLUMNS, UNTITLED};
pub use review_index::{init_index, IndexBuildReport, ReviewIndex, EMBED_BATCH_SIZE};
pub use store::{
    CollectionStats, ReviewStore, META_CSV_FINGERPRINT, META_DIMENSIONS, META_INDEXED_AT,
    META_MODEL,
};
pub use vectors::{bytes_to_embedding, cosine_distance, cosine_similarity, embedding_to_bytes};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A stored review as the index sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    /// `rating`, `date` and `title`
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// String metadata value, `""` when absent or not a string
    pub fn metadata_str(&self, key: &str) -> &str {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Nearest-neighbor search over review documents
///
/// Results are ordered by ascending cosine distance (0 = identical).
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<(Document, f64)>>;
}
