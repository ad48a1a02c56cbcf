//! Values passed between the review tools

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A review as handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub content: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    /// `1 - distance`, only set on freshly retrieved reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Rating from a JSON number or numeric string; anything else is `None`
pub(crate) fn rating_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|r| r.is_finite())
}

fn lenient_rating<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(rating_from_value(&value))
}

/// One element of a keyword or review list
///
/// A failed step yields a single [`Entry::Error`] in place of its list, so
/// the failure survives serialization as `{"error": "..."}` next to plain
/// keywords (JSON strings) and reviews (objects carrying `content`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry<T> {
    Error { error: String },
    Item(T),
}

impl<T> Entry<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Entry::Error {
            error: message.into(),
        }
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Error { .. } => None,
        }
    }
}

/// Keyword list as returned by extraction
pub type KeywordList = Vec<Entry<String>>;

/// Review list as returned by retrieval
pub type ReviewList = Vec<Entry<ReviewRecord>>;

/// Access to a list that may carry a diagnostic marker
pub trait EntryList<T> {
    /// First diagnostic message in the list
    fn diagnostic(&self) -> Option<&str>;

    /// Plain items, markers skipped
    fn items(&self) -> Vec<T>;
}

impl<T: Clone> EntryList<T> for [Entry<T>] {
    fn diagnostic(&self) -> Option<&str> {
        self.iter().find_map(|e| match e {
            Entry::Error { error } => Some(error.as_str()),
            Entry::Item(_) => None,
        })
    }

    fn items(&self) -> Vec<T> {
        self.iter().filter_map(Entry::item).cloned().collect()
    }
}

/// Terminal state of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

/// Assembled response of the `agent` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub query: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub reviews_count: usize,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub statistics: String,
    pub status: PipelineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    pub fn failed(query: &str, keywords: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            keywords,
            reviews_count: 0,
            summary: String::new(),
            statistics: String::new(),
            status: PipelineStatus::Error,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_is_distinguishable_from_keywords() {
        let parsed: KeywordList =
            serde_json::from_value(json!(["mouse", {"error": "Extraction failed: boom"}])).unwrap();
        assert_eq!(parsed[0], Entry::Item("mouse".to_string()));
        assert_eq!(parsed.diagnostic(), Some("Extraction failed: boom"));
        assert_eq!(parsed.items(), vec!["mouse".to_string()]);
    }

    #[test]
    fn test_marker_is_distinguishable_from_reviews() {
        let parsed: ReviewList = serde_json::from_value(json!([
            {"content": "Great mouse", "rating": 5, "date": "2024-01-01", "title": "A"},
            {"error": "Retrieval failed: index down"}
        ]))
        .unwrap();
        assert!(matches!(parsed[0], Entry::Item(ref r) if r.content == "Great mouse"));
        assert_eq!(parsed.diagnostic(), Some("Retrieval failed: index down"));
    }

    #[test]
    fn test_review_serialization_shape() {
        let record = ReviewRecord {
            content: "Nice".to_string(),
            rating: None,
            date: "2024-01-01".to_string(),
            title: "T".to_string(),
            similarity: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["rating"], Value::Null);
        assert!(value.get("similarity").is_none());

        let marker: Entry<ReviewRecord> = Entry::error("Retrieval failed: x");
        assert_eq!(
            serde_json::to_value(&marker).unwrap(),
            json!({"error": "Retrieval failed: x"})
        );
    }

    #[test]
    fn test_lenient_rating_input() {
        let records: Vec<ReviewRecord> = serde_json::from_value(json!([
            {"content": "a", "rating": "4"},
            {"content": "b", "rating": "great"},
            {"content": "c"}
        ]))
        .unwrap();
        assert_eq!(records[0].rating, Some(4.0));
        assert_eq!(records[1].rating, None);
        assert_eq!(records[2].rating, None);
        assert_eq!(records[2].title, "");
    }

    #[test]
    fn test_pipeline_status_serializes_lowercase() {
        let result = PipelineResult::failed("q", vec![], "boom");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "boom");
        assert!(!result.is_success());
    }
}
