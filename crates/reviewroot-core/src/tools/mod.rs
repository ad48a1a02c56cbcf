//! Review tools
//!
//! Keyword extraction, similarity-filtered retrieval, summarization and
//! rating statistics, chained by the [`Orchestrator`] and exposed as typed
//! [`ToolCall`]s.

mod dispatch;
mod keywords;
mod pipeline;
mod prompts;
mod qa;
mod retrieval;
mod statistics;
mod summary;
mod types;

pub use dispatch::{
    AgentArgs, CallerError, ExtractArgs, RetrieveArgs, ReviewTools, ReviewsArgs, ToolCall,
    ToolOutput, TOOL_NAMES,
};
pub use keywords::{parse_keywords, KeywordExtractor, EXTRACTION_FAILED_PREFIX};
pub use pipeline::{Orchestrator, PipelineStage};
pub use qa::{answer_question, QUESTION_FAILED_PREFIX};
pub use retrieval::{filter_by_similarity, ReviewAggregator, RETRIEVAL_FAILED_PREFIX};
pub use statistics::{RatingStats, StatisticsReporter, STATISTICS_FAILED_PREFIX};
pub use summary::{Summarizer, NO_REVIEWS_SUMMARY, SUMMARY_FAILED_PREFIX};
pub use types::{
    Entry, EntryList, KeywordList, PipelineResult, PipelineStatus, ReviewList, ReviewRecord,
};
