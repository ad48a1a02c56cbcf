//! MCP tool definitions and the call handler

use crate::protocol::*;
use anyhow::{anyhow, Result};
use reviewroot_core::tools::ReviewTools;
use reviewroot_core::ToolCall;
use serde_json::{json, Value};

pub fn agent_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "agent".to_string(),
        description: "Process a complete query through all steps: extract keywords, retrieve \
                      reviews, and generate comprehensive analysis"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "user_query": {
                    "type": "string",
                    "description": "The user's question or query to process"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of reviews to retrieve (default: 5)",
                    "default": 5
                }
            },
            "required": ["user_query"]
        }),
    }
}

pub fn extract_keywords_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "extract_important_keywords".to_string(),
        description: "Extract the most important keywords from a user query to search for \
                      relevant reviews."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "user_query": {
                    "type": "string",
                    "description": "The user's question or query"
                }
            },
            "required": ["user_query"]
        }),
    }
}

pub fn retrieve_reviews_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "retrieve_useful_reviews".to_string(),
        description: "Retrieve k reviews related to the given list of keywords.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "keywords": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of keywords to search for"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of reviews to retrieve, 1-50 (default: 5)",
                    "default": 5
                },
                "min_similarity": {
                    "type": "number",
                    "description": "Minimum similarity 0-1 a review must reach (default: configured threshold)"
                }
            },
            "required": ["keywords"]
        }),
    }
}

pub fn summarize_reviews_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "summarize_reviews".to_string(),
        description: "Generate a comprehensive summary of the given reviews, highlighting pros, \
                      cons, and key themes."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "reviews": {
                    "type": "array",
                    "items": review_schema(),
                    "description": "List of reviews to summarize"
                }
            },
            "required": ["reviews"]
        }),
    }
}

pub fn statistics_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_reviews_statistics".to_string(),
        description: "Compute statistics on the given reviews (average rating, sentiment \
                      distribution, etc.)."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "reviews": {
                    "type": "array",
                    "items": review_schema(),
                    "description": "List of reviews to analyze"
                }
            },
            "required": ["reviews"]
        }),
    }
}

fn review_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": { "type": "string" },
            "rating": { "type": ["number", "null"] },
            "date": { "type": "string" },
            "title": { "type": "string" }
        },
        "required": ["content"]
    })
}

/// Every advertised tool, in `tools/list` order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        agent_tool_definition(),
        extract_keywords_tool_definition(),
        retrieve_reviews_tool_definition(),
        summarize_reviews_tool_definition(),
        statistics_tool_definition(),
    ]
}

/// Parse `tools/call` params into a typed call
///
/// Errors are caller errors and map to invalid params.
pub fn parse_call(params: &Value) -> Result<ToolCall> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Missing tool name"))?;
    let arguments = params.get("arguments").cloned();
    Ok(ToolCall::parse(name, arguments)?)
}

/// Run a parsed call and wrap its output in the transport envelope
pub async fn handle_call(tools: &ReviewTools, call: ToolCall) -> ToolResult {
    let output = tools.dispatch(call).await;
    let is_error = output.is_failure();

    ToolResult {
        content: vec![Content::Text {
            text: output.to_text(),
        }],
        structured_content: serde_json::to_value(&output)
            .ok()
            .map(|result| json!({ "result": result })),
        is_error: is_error.then_some(true),
    }
}
