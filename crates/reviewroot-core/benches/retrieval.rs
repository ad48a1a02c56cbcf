//! Retrieval performance benchmarks
//!
//! Measures performance of:
//! - Exact cosine search over an in-memory review index
//! - HNSW-backed search above the ANN threshold
//! - Relevance filtering of ranked hits

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reviewroot_core::index::ANN_THRESHOLD;
use reviewroot_core::tools::filter_by_similarity;
use reviewroot_core::{Document, Embedder, Result, Retriever, ReviewIndex};
use std::sync::Arc;

const DIMENSIONS: usize = 64;

/// Deterministic pseudo-embedding derived from the text bytes
struct HashEmbedder;

fn pseudo_embedding(text: &str) -> Vec<f32> {
    let mut state: u32 = 2166136261;
    for byte in text.bytes() {
        state = (state ^ byte as u32).wrapping_mul(16777619);
    }
    (0..DIMENSIONS)
        .map(|i| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223 + i as u32);
            (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
        })
        .collect()
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(pseudo_embedding(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| pseudo_embedding(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

fn build_index(size: usize) -> ReviewIndex {
    let entries = (0..size)
        .map(|i| {
            let text = format!("Review {} of a wireless gaming mouse", i);
            let embedding = pseudo_embedding(&text);
            (Document::new(i.to_string(), text), embedding)
        })
        .collect();
    ReviewIndex::new(entries, Arc::new(HashEmbedder))
}

fn bench_index_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("index_search");

    for size in [100, ANN_THRESHOLD / 2, ANN_THRESHOLD * 2] {
        let index = build_index(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &index, |b, index| {
            b.iter(|| {
                runtime
                    .block_on(index.search(black_box("wireless mouse battery"), 10))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_relevance_filter(c: &mut Criterion) {
    let hits: Vec<(Document, f64)> = (0..50)
        .map(|i| (Document::new(i.to_string(), "review"), i as f64 / 25.0))
        .collect();

    c.bench_function("filter_by_similarity_50", |b| {
        b.iter(|| filter_by_similarity(black_box(hits.clone()), 50, 0.5))
    });
}

criterion_group!(benches, bench_index_search, bench_relevance_filter);
criterion_main!(benches);
