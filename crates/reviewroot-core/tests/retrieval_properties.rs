//! Property tests for the similarity threshold and k clamping

use proptest::prelude::*;
use reviewroot_core::config::{clamp_k, MAX_K};
use reviewroot_core::tools::filter_by_similarity;
use reviewroot_core::Document;

fn ranked_hits(mut distances: Vec<f64>) -> Vec<(Document, f64)> {
    distances.sort_by(|a, b| a.total_cmp(b));
    distances
        .into_iter()
        .enumerate()
        .map(|(i, d)| (Document::new(i.to_string(), format!("review {}", i)), d))
        .collect()
}

proptest! {
    #[test]
    fn prop_every_record_meets_threshold(
        distances in prop::collection::vec(0.0f64..=2.0, 0..80),
        k in 1usize..=MAX_K,
        min_similarity in 0.0f64..=1.0,
    ) {
        let records = filter_by_similarity(ranked_hits(distances), k, min_similarity);

        prop_assert!(records.len() <= k);
        for record in &records {
            let similarity = record.similarity.unwrap_or(f64::NEG_INFINITY);
            prop_assert!(similarity >= min_similarity);
        }
    }

    #[test]
    fn prop_order_is_non_increasing_in_similarity(
        distances in prop::collection::vec(0.0f64..=2.0, 0..80),
        k in 1usize..=MAX_K,
        min_similarity in 0.0f64..=1.0,
    ) {
        let records = filter_by_similarity(ranked_hits(distances), k, min_similarity);
        let similarities: Vec<f64> = records.iter().filter_map(|r| r.similarity).collect();

        prop_assert_eq!(similarities.len(), records.len());
        prop_assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prop_zero_threshold_keeps_everything_up_to_k(
        distances in prop::collection::vec(0.0f64..=1.0, 0..80),
        k in 1usize..=MAX_K,
    ) {
        let available = distances.len();
        let records = filter_by_similarity(ranked_hits(distances), k, 0.0);
        prop_assert_eq!(records.len(), available.min(k));
    }

    #[test]
    fn prop_clamp_k_stays_in_range(k in any::<i64>()) {
        let clamped = clamp_k(k);
        prop_assert!((1..=MAX_K).contains(&clamped));
        if (1..=MAX_K as i64).contains(&k) {
            prop_assert_eq!(clamped as i64, k);
        }
    }
}
