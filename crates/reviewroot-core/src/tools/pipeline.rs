//! Fixed-sequence review pipeline behind the `agent` operation

use super::keywords::KeywordExtractor;
use super::retrieval::ReviewAggregator;
use super::statistics::{StatisticsReporter, STATISTICS_FAILED_PREFIX};
use super::summary::{Summarizer, SUMMARY_FAILED_PREFIX};
use super::types::{EntryList, PipelineResult, PipelineStatus};
use crate::config::RetrievalConfig;
use crate::index::Retriever;
use crate::llm::Generator;
use std::fmt;
use std::sync::Arc;

/// Pipeline states; `Success` and `Error` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    KeywordsExtracted,
    ReviewsRetrieved,
    Summarized,
    StatisticsComputed,
    Success,
    Error,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::KeywordsExtracted => "keywords_extracted",
            Self::ReviewsRetrieved => "reviews_retrieved",
            Self::Summarized => "summarized",
            Self::StatisticsComputed => "statistics_computed",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Runs extract → retrieve → {summarize, statistics} for one query
pub struct Orchestrator {
    extractor: KeywordExtractor,
    aggregator: ReviewAggregator,
    summarizer: Summarizer,
    statistics: StatisticsReporter,
    default_k: usize,
    min_similarity: f64,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn Retriever>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            extractor: KeywordExtractor::new(generator.clone(), retrieval.max_keywords),
            aggregator: ReviewAggregator::new(retriever),
            summarizer: Summarizer::new(generator.clone()),
            statistics: StatisticsReporter::new(generator),
            default_k: retrieval.default_k,
            min_similarity: retrieval.min_similarity,
        }
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    pub fn aggregator(&self) -> &ReviewAggregator {
        &self.aggregator
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn statistics(&self) -> &StatisticsReporter {
        &self.statistics
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    pub fn min_similarity(&self) -> f64 {
        self.min_similarity
    }

    /// Run the whole pipeline; failures end in an `error` result, never a panic
    pub async fn run(&self, query: &str, k: Option<i64>) -> PipelineResult {
        let k = k.unwrap_or(self.default_k as i64);
        transition(PipelineStage::Start, query);

        let extracted = self.extractor.extract(query).await;
        if let Some(error) = extracted.diagnostic() {
            return fail(query, Vec::new(), error);
        }
        let keywords = extracted.items();
        transition(PipelineStage::KeywordsExtracted, query);

        let retrieved = self
            .aggregator
            .retrieve(&keywords, k, self.min_similarity)
            .await;
        if let Some(error) = retrieved.diagnostic() {
            return fail(query, keywords, error);
        }
        let reviews = retrieved.items();
        transition(PipelineStage::ReviewsRetrieved, query);

        let (summary, statistics) = tokio::join!(
            self.summarizer.try_summarize(&reviews),
            self.statistics.try_report(&reviews)
        );

        let summary = match summary {
            Ok(summary) => summary,
            Err(e) => return fail(query, keywords, &format!("{}{}", SUMMARY_FAILED_PREFIX, e)),
        };
        transition(PipelineStage::Summarized, query);

        let statistics = match statistics {
            Ok(statistics) => statistics,
            Err(e) => {
                return fail(
                    query,
                    keywords,
                    &format!("{}{}", STATISTICS_FAILED_PREFIX, e),
                )
            }
        };
        transition(PipelineStage::StatisticsComputed, query);

        transition(PipelineStage::Success, query);
        PipelineResult {
            query: query.to_string(),
            keywords,
            reviews_count: reviews.len(),
            summary,
            statistics,
            status: PipelineStatus::Success,
            error: None,
        }
    }
}

fn transition(stage: PipelineStage, query: &str) {
    tracing::debug!("Pipeline stage {} for query {:?}", stage, query);
}

fn fail(query: &str, keywords: Vec<String>, error: &str) -> PipelineResult {
    tracing::warn!("Pipeline failed for query {:?}: {}", query, error);
    transition(PipelineStage::Error, query);
    PipelineResult::failed(query, keywords, error)
}
