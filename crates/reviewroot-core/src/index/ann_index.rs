//! HNSW approximate nearest neighbor index over loaded review embeddings

use super::vectors::cosine_distance;
use instant_distance::{Builder, HnswMap, Search};

/// Minimum embedding count to justify building an ANN index.
/// Below this threshold, brute-force is fast enough.
pub const ANN_THRESHOLD: usize = 1000;

#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        cosine_distance(&self.values, &other.values)
    }
}

/// HNSW map from embedding to its position in the review list
pub struct AnnIndex {
    map: Option<HnswMap<EmbeddingPoint, usize>>,
}

impl AnnIndex {
    /// Build over `embeddings`; stays unbuilt below [`ANN_THRESHOLD`]
    pub fn build(embeddings: &[Vec<f32>]) -> Self {
        Self::build_with_threshold(embeddings, ANN_THRESHOLD)
    }

    pub(crate) fn build_with_threshold(embeddings: &[Vec<f32>], threshold: usize) -> Self {
        let len = embeddings.len();
        if len < threshold {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                len,
                threshold
            );
            return Self { map: None };
        }

        let points: Vec<EmbeddingPoint> = embeddings
            .iter()
            .map(|values| EmbeddingPoint {
                values: values.clone(),
            })
            .collect();
        let positions: Vec<usize> = (0..len).collect();

        let map = Builder::default().build(points, positions);
        tracing::info!("Built ANN index with {} embeddings", len);
        Self { map: Some(map) }
    }

    /// Positions of up to `k` approximate nearest neighbors
    ///
    /// Empty when the index was not built.
    pub fn candidates(&self, query: &[f32], k: usize) -> Vec<usize> {
        let Some(map) = self.map.as_ref() else {
            return Vec::new();
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();
        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| *item.value)
            .collect()
    }

    /// Whether the HNSW graph has been built
    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }
}
