//! Similarity-filtered review retrieval
//!
//! The index reports cosine distance in `[0, 2]` (0 = identical direction);
//! `similarity = 1 - distance` is therefore in `[-1, 1]` and only meaningful
//! for metrics normalized that way.

use super::types::{rating_from_value, Entry, ReviewList, ReviewRecord};
use crate::config::clamp_k;
use crate::index::{Document, Retriever};
use std::sync::Arc;

/// Prefix of the diagnostic marker emitted when the index failed
pub const RETRIEVAL_FAILED_PREFIX: &str = "Retrieval failed: ";

/// Keywords → search string → scored, filtered reviews
pub struct ReviewAggregator {
    retriever: Arc<dyn Retriever>,
}

impl ReviewAggregator {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }

    /// Up to `k` reviews whose similarity reaches `min_similarity`
    ///
    /// `k` is clamped into `[1, MAX_K]`. An empty keyword list still queries
    /// the index with an empty search string.
    pub async fn retrieve(&self, keywords: &[String], k: i64, min_similarity: f64) -> ReviewList {
        let search_query = keywords.join(" ");
        let k = clamp_k(k);

        match self.retriever.search(&search_query, k).await {
            Ok(hits) => {
                let returned = hits.len();
                let records = filter_by_similarity(hits, k, min_similarity);
                tracing::debug!(
                    "Retrieved {} reviews for {:?}, {} kept at min_similarity {}",
                    returned,
                    search_query,
                    records.len(),
                    min_similarity
                );
                records.into_iter().map(Entry::Item).collect()
            }
            Err(e) => {
                tracing::warn!("Review retrieval failed: {}", e);
                vec![Entry::error(format!("{}{}", RETRIEVAL_FAILED_PREFIX, e))]
            }
        }
    }
}

/// Relevance filter: distance → similarity, drop reviews below the threshold
///
/// Index order is preserved and at most `k` records are returned.
pub fn filter_by_similarity(
    hits: Vec<(Document, f64)>,
    k: usize,
    min_similarity: f64,
) -> Vec<ReviewRecord> {
    hits.into_iter()
        .take(k)
        .filter_map(|(doc, distance)| {
            let similarity = 1.0 - distance;
            (similarity >= min_similarity).then(|| to_record(doc, similarity))
        })
        .collect()
}

fn to_record(doc: Document, similarity: f64) -> ReviewRecord {
    ReviewRecord {
        rating: doc.metadata.get("rating").and_then(rating_from_value),
        date: doc.metadata_str("date").to_string(),
        title: doc.metadata_str("title").to_string(),
        content: doc.text,
        similarity: Some(similarity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ReviewRootError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedRetriever {
        hits: Vec<(Document, f64)>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn search(&self, query: &str, k: usize) -> Result<Vec<(Document, f64)>> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((query.to_string(), k));
            }
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    struct BrokenRetriever;

    #[async_trait]
    impl Retriever for BrokenRetriever {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<(Document, f64)>> {
            Err(ReviewRootError::Index("collection missing".to_string()))
        }
    }

    fn fixed(distances: &[f64]) -> Arc<FixedRetriever> {
        let hits = distances
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let doc = Document::new(i.to_string(), format!("review {}", i))
                    .with_metadata("rating", "4")
                    .with_metadata("date", "2024-02-01");
                (doc, d)
            })
            .collect();
        Arc::new(FixedRetriever {
            hits,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_joins_keywords_and_clamps_k() {
        let retriever = fixed(&[0.1, 0.2]);
        let aggregator = ReviewAggregator::new(retriever.clone());
        let keywords = vec!["wireless".to_string(), "mouse".to_string()];

        aggregator.retrieve(&keywords, 0, 0.0).await;
        aggregator.retrieve(&keywords, 500, 0.0).await;
        aggregator.retrieve(&[], 3, 0.0).await;

        let seen = retriever.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("wireless mouse".to_string(), 1),
                ("wireless mouse".to_string(), 50),
                (String::new(), 3)
            ]
        );
    }

    #[tokio::test]
    async fn test_threshold_filters_and_keeps_order() {
        let aggregator = ReviewAggregator::new(fixed(&[0.1, 0.3, 0.45, 0.9]));
        let reviews = aggregator
            .retrieve(&["mouse".to_string()], 10, 0.5)
            .await;

        let similarities: Vec<f64> = reviews
            .iter()
            .filter_map(Entry::item)
            .filter_map(|r| r.similarity)
            .collect();
        assert_eq!(similarities.len(), 3);
        assert!((similarities[0] - 0.9).abs() < 1e-9);
        assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_record_mapping() {
        let aggregator = ReviewAggregator::new(fixed(&[0.25]));
        let reviews = aggregator.retrieve(&["mouse".to_string()], 1, 0.0).await;
        let Entry::Item(record) = &reviews[0] else {
            panic!("expected a review, got {:?}", reviews[0]);
        };
        assert_eq!(record.content, "review 0");
        assert_eq!(record.rating, Some(4.0));
        assert_eq!(record.date, "2024-02-01");
        assert_eq!(record.title, "");
        assert_eq!(record.similarity, Some(0.75));
    }

    #[tokio::test]
    async fn test_index_failure_becomes_marker() {
        let aggregator = ReviewAggregator::new(Arc::new(BrokenRetriever));
        let reviews = aggregator.retrieve(&["mouse".to_string()], 5, 0.0).await;
        assert_eq!(reviews.len(), 1);
        assert_eq!(
            reviews[0],
            Entry::error("Retrieval failed: Index error: collection missing")
        );
    }

    #[test]
    fn test_filter_never_exceeds_k() {
        let hits: Vec<_> = (0..8)
            .map(|i| (Document::new(i.to_string(), "r"), 0.0))
            .collect();
        assert_eq!(filter_by_similarity(hits, 3, 0.0).len(), 3);
    }
}
