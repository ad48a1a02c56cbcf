//! Keyword extraction from free-text queries

use super::prompts::keywords_prompt;
use super::types::{Entry, KeywordList};
use crate::llm::{strip_thinking, Generator};
use std::sync::Arc;

/// Prefix of the diagnostic marker emitted when the LLM call failed
pub const EXTRACTION_FAILED_PREFIX: &str = "Extraction failed: ";

/// Reduces a user query to a short ordered list of search terms
pub struct KeywordExtractor {
    generator: Arc<dyn Generator>,
    max_keywords: usize,
}

impl KeywordExtractor {
    pub fn new(generator: Arc<dyn Generator>, max_keywords: usize) -> Self {
        Self {
            generator,
            max_keywords: max_keywords.max(1),
        }
    }

    /// Keywords for `query`, or a single diagnostic marker
    pub async fn extract(&self, query: &str) -> KeywordList {
        match self.generator.generate(&keywords_prompt(query)).await {
            Ok(response) => parse_keywords(&response, query, self.max_keywords)
                .into_iter()
                .map(Entry::Item)
                .collect(),
            Err(e) => {
                tracing::warn!("Keyword extraction failed: {}", e);
                vec![Entry::error(format!("{}{}", EXTRACTION_FAILED_PREFIX, e))]
            }
        }
    }
}

/// Split an LLM keyword line into at most `max` keywords
///
/// A response without a single usable token yields the raw query.
pub fn parse_keywords(response: &str, query: &str, max: usize) -> Vec<String> {
    let keywords: Vec<String> = strip_thinking(response)
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(max)
        .map(String::from)
        .collect();

    if keywords.is_empty() {
        tracing::debug!("No keywords in LLM response, using the raw query");
        vec![query.to_string()]
    } else {
        keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        assert_eq!(
            parse_keywords("mouse, wireless, rgb, battery, dpi", "q", 5),
            vec!["mouse", "wireless", "rgb", "battery", "dpi"]
        );
    }

    #[test]
    fn test_parse_caps_and_keeps_llm_order() {
        let parsed = parse_keywords("a, b, , c,d,e,f,g", "q", 5);
        assert_eq!(parsed, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        assert_eq!(
            parse_keywords("mouse, mouse, mice", "q", 5),
            vec!["mouse", "mouse", "mice"]
        );
    }

    #[test]
    fn test_parse_empty_response_falls_back_to_query() {
        assert_eq!(
            parse_keywords(" , ,\n", "gaming mouse", 5),
            vec!["gaming mouse"]
        );
    }

    #[test]
    fn test_parse_strips_thinking() {
        let response = "<think>user wants a mouse, maybe wireless</think>\nmouse, wireless";
        assert_eq!(parse_keywords(response, "q", 5), vec!["mouse", "wireless"]);
    }
}
