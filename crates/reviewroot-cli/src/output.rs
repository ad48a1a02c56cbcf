//! Output formatters

use crate::app::OutputFormat;
use anyhow::Result;
use reviewroot_core::{strip_thinking, PipelineResult, PipelineStatus};
use serde::Serialize;

/// Pretty JSON for `--format json`
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// LLM text as shown to a person: thinking section removed, trimmed
pub fn display_text(text: &str) -> &str {
    strip_thinking(text).trim()
}

/// Copy of `result` with display text in `summary` and `statistics`
pub fn display_pipeline(result: &PipelineResult) -> PipelineResult {
    PipelineResult {
        summary: display_text(&result.summary).to_string(),
        statistics: display_text(&result.statistics).to_string(),
        ..result.clone()
    }
}

/// Render a pipeline result
///
/// JSON keeps the raw LLM text; the terminal view shows display text.
pub fn format_pipeline(result: &PipelineResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Cli => Ok(format_pipeline_text(result)),
    }
}

fn format_pipeline_text(result: &PipelineResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Query:     {}\n", result.query));
    output.push_str(&format!("Keywords:  {}\n", result.keywords.join(", ")));
    output.push_str(&format!("Reviews:   {}\n", result.reviews_count));

    match result.status {
        PipelineStatus::Success => {
            output.push_str("\nSummary:\n");
            push_indented(&mut output, display_text(&result.summary));
            output.push_str("\nStatistics:\n");
            push_indented(&mut output, display_text(&result.statistics));
        }
        PipelineStatus::Error => {
            output.push_str(&format!(
                "\nError: {}\n",
                result.error.as_deref().unwrap_or("unknown failure")
            ));
        }
    }

    output
}

fn push_indented(output: &mut String, text: &str) {
    for line in text.lines() {
        output.push_str(&format!("  {}\n", line));
    }
}
