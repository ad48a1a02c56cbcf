//! Review summarization

use super::prompts::summary_prompt;
use super::types::ReviewRecord;
use crate::error::Result;
use crate::llm::Generator;
use std::sync::Arc;

/// Returned for an empty review list; the LLM is not called
pub const NO_REVIEWS_SUMMARY: &str = "No reviews found to summarize.";

/// Prefix of the string returned when the LLM call failed
pub const SUMMARY_FAILED_PREFIX: &str = "Summarization failed: ";

/// LLM prose summary of a review list
pub struct Summarizer {
    generator: Arc<dyn Generator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Raw LLM summary, or the LLM error
    pub async fn try_summarize(&self, reviews: &[ReviewRecord]) -> Result<String> {
        if reviews.is_empty() {
            return Ok(NO_REVIEWS_SUMMARY.to_string());
        }
        self.generator.generate(&summary_prompt(reviews)).await
    }
}
