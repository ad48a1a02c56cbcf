//! Typed tool calls and their dispatch

use super::pipeline::Orchestrator;
use super::statistics::STATISTICS_FAILED_PREFIX;
use super::summary::SUMMARY_FAILED_PREFIX;
use super::types::{KeywordList, PipelineResult, ReviewList, ReviewRecord};
use crate::error::Result as CoreResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Names of every callable tool, in advertised order
pub const TOOL_NAMES: [&str; 5] = [
    "agent",
    "extract_important_keywords",
    "retrieve_useful_reviews",
    "summarize_reviews",
    "get_reviews_statistics",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentArgs {
    pub user_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractArgs {
    pub user_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveArgs {
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewsArgs {
    pub reviews: Vec<ReviewRecord>,
}

/// One invocation of a review tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    Agent(AgentArgs),
    ExtractImportantKeywords(ExtractArgs),
    RetrieveUsefulReviews(RetrieveArgs),
    SummarizeReviews(ReviewsArgs),
    GetReviewsStatistics(ReviewsArgs),
}

/// Result of a dispatched [`ToolCall`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Pipeline(PipelineResult),
    Keywords(KeywordList),
    Reviews(ReviewList),
    Text(String),
    /// Failure message of a text-producing tool
    Diagnostic(String),
}

impl ToolOutput {
    /// Human-readable text for the transport envelope
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) | Self::Diagnostic(text) => text.clone(),
            Self::Pipeline(result) => serde_json::to_string_pretty(result).unwrap_or_default(),
            Self::Keywords(keywords) => serde_json::to_string(keywords).unwrap_or_default(),
            Self::Reviews(reviews) => serde_json::to_string(reviews).unwrap_or_default(),
        }
    }

    /// Whether the tool reported a failure of its own
    pub fn is_failure(&self) -> bool {
        use super::types::EntryList;
        match self {
            Self::Pipeline(result) => !result.is_success(),
            Self::Keywords(keywords) => keywords.diagnostic().is_some(),
            Self::Reviews(reviews) => reviews.diagnostic().is_some(),
            Self::Text(_) => false,
            Self::Diagnostic(_) => true,
        }
    }
}

/// Invalid tool invocation by the caller
#[derive(Debug, Error, PartialEq)]
pub enum CallerError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

impl ToolCall {
    /// Build a call from a tool name and its JSON arguments
    ///
    /// Missing arguments are read as an empty object, so required fields are
    /// reported by name.
    pub fn parse(name: &str, arguments: Option<Value>) -> Result<Self, CallerError> {
        if !TOOL_NAMES.contains(&name) {
            return Err(CallerError::UnknownTool(name.to_string()));
        }

        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(args) => args,
        };
        let call: Self = serde_json::from_value(serde_json::json!({
            "name": name,
            "arguments": arguments,
        }))
        .map_err(|e| CallerError::InvalidArguments {
            tool: name.to_string(),
            message: e.to_string(),
        })?;

        call.validate()?;
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Agent(_) => TOOL_NAMES[0],
            Self::ExtractImportantKeywords(_) => TOOL_NAMES[1],
            Self::RetrieveUsefulReviews(_) => TOOL_NAMES[2],
            Self::SummarizeReviews(_) => TOOL_NAMES[3],
            Self::GetReviewsStatistics(_) => TOOL_NAMES[4],
        }
    }

    fn validate(&self) -> Result<(), CallerError> {
        let invalid = |message: &str| CallerError::InvalidArguments {
            tool: self.name().to_string(),
            message: message.to_string(),
        };

        match self {
            Self::Agent(AgentArgs { user_query, .. })
            | Self::ExtractImportantKeywords(ExtractArgs { user_query })
                if user_query.trim().is_empty() =>
            {
                Err(invalid("user_query must not be empty"))
            }
            Self::RetrieveUsefulReviews(RetrieveArgs {
                min_similarity: Some(min),
                ..
            }) if !(0.0..=1.0).contains(min) => Err(invalid("min_similarity must be within [0, 1]")),
            _ => Ok(()),
        }
    }
}

/// The five review operations behind one exhaustive dispatch
pub struct ReviewTools {
    orchestrator: Orchestrator,
}

impl ReviewTools {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn dispatch(&self, call: ToolCall) -> ToolOutput {
        tracing::debug!("Dispatching tool {}", call.name());
        let orchestrator = &self.orchestrator;

        match call {
            ToolCall::Agent(args) => {
                ToolOutput::Pipeline(orchestrator.run(&args.user_query, args.k).await)
            }
            ToolCall::ExtractImportantKeywords(args) => {
                ToolOutput::Keywords(orchestrator.extractor().extract(&args.user_query).await)
            }
            ToolCall::RetrieveUsefulReviews(args) => {
                let k = args.k.unwrap_or(orchestrator.default_k() as i64);
                let min_similarity = args
                    .min_similarity
                    .unwrap_or(orchestrator.min_similarity());
                ToolOutput::Reviews(
                    orchestrator
                        .aggregator()
                        .retrieve(&args.keywords, k, min_similarity)
                        .await,
                )
            }
            ToolCall::SummarizeReviews(args) => text_output(
                orchestrator.summarizer().try_summarize(&args.reviews).await,
                SUMMARY_FAILED_PREFIX,
            ),
            ToolCall::GetReviewsStatistics(args) => text_output(
                orchestrator.statistics().try_report(&args.reviews).await,
                STATISTICS_FAILED_PREFIX,
            ),
        }
    }
}

fn text_output(result: CoreResult<String>, failed_prefix: &str) -> ToolOutput {
    match result {
        Ok(text) => ToolOutput::Text(text),
        Err(e) => {
            tracing::warn!("{}{}", failed_prefix, e);
            ToolOutput::Diagnostic(format!("{}{}", failed_prefix, e))
        }
    }
}
