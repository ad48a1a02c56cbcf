//! In-memory review index and its build from the CSV corpus

use super::ann_index::AnnIndex;
use super::csv_loader::{csv_fingerprint, load_reviews_csv};
use super::store::{ReviewStore, META_CSV_FINGERPRINT};
use super::vectors::cosine_distance;
use super::{Document, Retriever};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::llm::Embedder;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Reviews sent to the embedder per request
pub const EMBED_BATCH_SIZE: usize = 32;

/// Embedded reviews held in memory for search
pub struct ReviewIndex {
    entries: Vec<(Document, Vec<f32>)>,
    ann: AnnIndex,
    embedder: Arc<dyn Embedder>,
}

impl ReviewIndex {
    /// Build from already embedded documents
    pub fn new(entries: Vec<(Document, Vec<f32>)>, embedder: Arc<dyn Embedder>) -> Self {
        let vectors: Vec<Vec<f32>> = entries.iter().map(|(_, v)| v.clone()).collect();
        let ann = AnnIndex::build(&vectors);
        Self {
            entries,
            ann,
            embedder,
        }
    }

    /// Load a stored collection
    pub fn load(store: &ReviewStore, collection: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let entries = store.load_collection(collection)?;
        tracing::debug!(
            "Loaded {} embedded reviews from collection '{}'",
            entries.len(),
            collection
        );
        Ok(Self::new(entries, embedder))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact nearest neighbors over `positions`, ascending distance
    ///
    /// Ties keep corpus order.
    fn rank(&self, query: &[f32], positions: impl Iterator<Item = usize>, k: usize) -> Vec<(Document, f64)> {
        let mut scored: Vec<(usize, f64)> = positions
            .map(|i| (i, cosine_distance(query, &self.entries[i].1) as f64))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(k)
            .map(|(i, distance)| (self.entries[i].0.clone(), distance))
            .collect()
    }
}

#[async_trait]
impl Retriever for ReviewIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<(Document, f64)>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        // Nothing to embed: every review is equally (un)related
        if query.trim().is_empty() {
            return Ok(self
                .entries
                .iter()
                .take(k)
                .map(|(doc, _)| (doc.clone(), 1.0))
                .collect());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let results = if self.ann.is_built() {
            let candidates = self.ann.candidates(&query_embedding, k);
            self.rank(&query_embedding, candidates.into_iter(), k)
        } else {
            self.rank(&query_embedding, 0..self.entries.len(), k)
        };

        tracing::debug!("Index search for {:?} returned {} reviews", query, results.len());
        Ok(results)
    }
}

/// Outcome of [`init_index`]
#[derive(Debug, Clone, Serialize)]
pub struct IndexBuildReport {
    pub collection: String,
    pub documents: usize,
    pub rebuilt: bool,
    /// Why the collection was (re)built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Make sure the collection in `store` reflects the CSV corpus
///
/// The collection is rebuilt when `auto_recreate` is set, when it is empty,
/// or when the CSV no longer matches the fingerprint recorded at the last
/// build. `progress` receives `(embedded, total)` after every batch.
pub async fn init_index(
    store: &mut ReviewStore,
    config: &IndexConfig,
    embedder: &dyn Embedder,
    auto_recreate: bool,
    progress: &(dyn Fn(usize, usize) + Sync),
) -> Result<IndexBuildReport> {
    let collection = config.collection.as_str();
    let existing = store.count(collection)?;

    let fingerprint = if config.csv_path.exists() {
        Some(csv_fingerprint(&config.csv_path)?)
    } else {
        None
    };

    let reason = if auto_recreate {
        Some("recreate requested")
    } else if existing == 0 {
        Some("collection is empty")
    } else if fingerprint.is_some()
        && store.get_meta(collection, META_CSV_FINGERPRINT)? != fingerprint
    {
        Some("review CSV changed")
    } else {
        None
    };

    let Some(reason) = reason else {
        tracing::info!(
            "Collection '{}' already holds {} reviews",
            collection,
            existing
        );
        return Ok(IndexBuildReport {
            collection: collection.to_string(),
            documents: existing,
            rebuilt: false,
            reason: None,
        });
    };

    tracing::info!("Rebuilding collection '{}': {}", collection, reason);
    let documents = load_reviews_csv(&config.csv_path)?;
    store.clear_collection(collection)?;

    let total = documents.len();
    let mut dimensions = embedder.dimensions();
    let mut embedded = 0;

    for batch in documents.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if let Some(first) = embeddings.first() {
            dimensions = first.len();
        }

        let rows: Vec<(Document, Vec<f32>)> = batch.iter().cloned().zip(embeddings).collect();
        store.insert_reviews(collection, embedder.model_name(), &rows)?;

        embedded += batch.len();
        progress(embedded, total);
    }

    store.record_build(
        collection,
        embedder.model_name(),
        dimensions,
        fingerprint.as_deref(),
    )?;

    Ok(IndexBuildReport {
        collection: collection.to_string(),
        documents: store.count(collection)?,
        rebuilt: true,
        reason: Some(reason.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VOCAB: [&str; 6] = ["mouse", "wireless", "battery", "rgb", "keyboard", "cheap"];

    /// Bag-of-words embedder over a tiny vocabulary
    struct WordEmbedder {
        calls: AtomicUsize,
    }

    impl WordEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn vector(text: &str) -> Vec<f32> {
            let lower = text.to_lowercase();
            VOCAB
                .iter()
                .map(|w| lower.matches(w).count() as f32)
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for WordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            VOCAB.len()
        }

        fn model_name(&self) -> &str {
            "word-embedder"
        }
    }

    fn index_of(texts: &[&str]) -> ReviewIndex {
        let entries = texts
            .iter()
            .enumerate()
            .map(|(i, t)| (Document::new(i.to_string(), *t), WordEmbedder::vector(t)))
            .collect();
        ReviewIndex::new(entries, Arc::new(WordEmbedder::new()))
    }

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let index = index_of(&[
            "cheap keyboard",
            "wireless mouse with long battery",
            "mouse",
            "rgb keyboard",
        ]);

        let results = index.search("wireless mouse battery", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0.id, "1");
        assert_eq!(results[1].0.id, "2");
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(results[0].1 < 0.001);
    }

    #[tokio::test]
    async fn test_search_caps_at_corpus_size() {
        let index = index_of(&["mouse", "keyboard"]);
        let results = index.search("mouse", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_returns_corpus_order() {
        let index = index_of(&["mouse", "keyboard", "battery"]);
        let results = index.search("  ", 2).await.unwrap();
        let ids: Vec<_> = results.iter().map(|(d, _)| d.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert!(results.iter().all(|(_, d)| *d == 1.0));
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = index_of(&[]);
        assert!(index.is_empty());
        assert!(index.search("mouse", 5).await.unwrap().is_empty());
    }

    fn write_corpus(dir: &tempfile::TempDir, rows: usize) -> IndexConfig {
        let csv_path = dir.path().join("reviews.csv");
        let mut body = String::from("Title,Date,Rating,Review\n");
        for i in 0..rows {
            body.push_str(&format!("Review {i},2024-01-01,{},wireless mouse number {i}\n", i % 5 + 1));
        }
        std::fs::write(&csv_path, body).unwrap();
        IndexConfig {
            csv_path,
            db_path: dir.path().join("reviews.sqlite"),
            collection: "mice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_init_index_builds_once_and_detects_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = write_corpus(&dir, 40);
        let mut store = ReviewStore::open(&config.db_path).unwrap();
        let embedder = WordEmbedder::new();
        let batches = AtomicUsize::new(0);
        let progress = |_: usize, _: usize| {
            batches.fetch_add(1, Ordering::SeqCst);
        };

        let report = init_index(&mut store, &config, &embedder, false, &progress)
            .await
            .unwrap();
        assert!(report.rebuilt);
        assert_eq!(report.documents, 40);
        assert_eq!(batches.load(Ordering::SeqCst), 2);

        let again = init_index(&mut store, &config, &embedder, false, &progress)
            .await
            .unwrap();
        assert!(!again.rebuilt);
        assert_eq!(again.documents, 40);

        let config = write_corpus(&dir, 3);
        let changed = init_index(&mut store, &config, &embedder, false, &progress)
            .await
            .unwrap();
        assert!(changed.rebuilt);
        assert_eq!(changed.documents, 3);
        assert_eq!(changed.reason.as_deref(), Some("review CSV changed"));

        let forced = init_index(&mut store, &config, &embedder, true, &progress)
            .await
            .unwrap();
        assert!(forced.rebuilt);

        let index = ReviewIndex::load(&store, "mice", Arc::new(WordEmbedder::new())).unwrap();
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_init_index_without_csv_fails_on_empty_collection() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = IndexConfig {
            csv_path: dir.path().join("missing.csv"),
            db_path: dir.path().join("reviews.sqlite"),
            collection: "mice".to_string(),
        };
        let mut store = ReviewStore::open(&config.db_path).unwrap();
        let result = init_index(&mut store, &config, &WordEmbedder::new(), false, &|_, _| {}).await;
        assert!(result.is_err());
    }
}
