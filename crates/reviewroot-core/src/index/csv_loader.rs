//! Review corpus loading from CSV

use super::Document;
use crate::error::{Result, ReviewRootError};
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Columns every review CSV must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["Title", "Date", "Rating", "Review"];

/// Title stored when a row has none
pub const UNTITLED: &str = "No Title";

/// Parse the review CSV into index documents
///
/// Document ids are the zero-based row numbers, so re-loading the same file
/// yields the same ids.
pub fn load_reviews_csv(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(ReviewRootError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("CSV file not found: {}", path.display()),
        )));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&c| position(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReviewRootError::MissingColumns(missing));
    }

    // Presence checked above
    let [title_idx, date_idx, rating_idx, review_idx] =
        REQUIRED_COLUMNS.map(|c| position(c).unwrap_or_default());

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let title = field(title_idx);
        let review = field(review_idx);
        let rating = parse_rating(field(rating_idx));
        if rating.is_none() && !field(rating_idx).is_empty() {
            tracing::warn!(
                "Row {}: unreadable rating {:?}, storing null",
                row,
                field(rating_idx)
            );
        }

        let text = if title.is_empty() {
            review.to_string()
        } else {
            format!("{} - {}", title, review)
        };

        let mut metadata = HashMap::new();
        metadata.insert(
            "rating".to_string(),
            rating.map(Value::from).unwrap_or(Value::Null),
        );
        metadata.insert("date".to_string(), Value::from(field(date_idx)));
        metadata.insert(
            "title".to_string(),
            Value::from(if title.is_empty() { UNTITLED } else { title }),
        );

        documents.push(Document {
            id: row.to_string(),
            text,
            metadata,
        });
    }

    tracing::debug!("Loaded {} reviews from {}", documents.len(), path.display());
    Ok(documents)
}

/// Fingerprint of the CSV bytes, used to detect a changed corpus
pub fn csv_fingerprint(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn parse_rating(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|r| r.is_finite())
}
