//! SQLite persistence for reviews and their embeddings
//!
//! Embeddings are stored as little-endian f32 BLOBs; similarity is computed
//! in Rust once the collection is loaded into a [`super::ReviewIndex`].

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::Document;
use crate::error::{Result, ReviewRootError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    content TEXT NOT NULL,
    rating REAL,
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE TABLE IF NOT EXISTS review_embeddings (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    model TEXT NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE TABLE IF NOT EXISTS index_meta (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (collection, key)
);
"#;

/// Meta key for the embedding model used to build a collection
pub const META_MODEL: &str = "model";
/// Meta key for the embedding dimensions of a collection
pub const META_DIMENSIONS: &str = "dimensions";
/// Meta key for the fingerprint of the CSV a collection was built from
pub const META_CSV_FINGERPRINT: &str = "csv_fingerprint";
/// Meta key for the RFC 3339 build time
pub const META_INDEXED_AT: &str = "indexed_at";

/// Review store backed by SQLite
pub struct ReviewStore {
    conn: Connection,
    path: Option<PathBuf>,
}

/// Summary of a stored collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub collection: String,
    pub review_count: usize,
    pub embedded_count: usize,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
    pub indexed_at: Option<String>,
}

impl ReviewStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Location on disk, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of embedded reviews in a collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM review_embeddings WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete every review, embedding and meta entry of a collection
    pub fn clear_collection(&mut self, collection: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM review_embeddings WHERE collection = ?1",
            params![collection],
        )?;
        tx.execute("DELETE FROM reviews WHERE collection = ?1", params![collection])?;
        tx.execute(
            "DELETE FROM index_meta WHERE collection = ?1",
            params![collection],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Insert reviews with their embeddings in one transaction
    pub fn insert_reviews(
        &mut self,
        collection: &str,
        model: &str,
        reviews: &[(Document, Vec<f32>)],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_review = tx.prepare(
                "INSERT OR REPLACE INTO reviews (collection, id, content, rating, date, title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let mut insert_embedding = tx.prepare(
                "INSERT OR REPLACE INTO review_embeddings (collection, id, model, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (doc, embedding) in reviews {
                insert_review.execute(params![
                    collection,
                    doc.id,
                    doc.text,
                    doc.metadata.get("rating").and_then(Value::as_f64),
                    doc.metadata_str("date"),
                    doc.metadata_str("title"),
                ])?;
                insert_embedding.execute(params![
                    collection,
                    doc.id,
                    model,
                    embedding_to_bytes(embedding)
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Load every embedded review of a collection in insertion-id order
    pub fn load_collection(&self, collection: &str) -> Result<Vec<(Document, Vec<f32>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.content, r.rating, r.date, r.title, e.embedding
             FROM reviews r
             JOIN review_embeddings e ON e.collection = r.collection AND e.id = r.id
             WHERE r.collection = ?1
             ORDER BY CAST(r.id AS INTEGER), r.id",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let rating: Option<f64> = row.get(2)?;
            let mut metadata = HashMap::new();
            metadata.insert(
                "rating".to_string(),
                rating.map(Value::from).unwrap_or(Value::Null),
            );
            metadata.insert("date".to_string(), Value::from(row.get::<_, String>(3)?));
            metadata.insert("title".to_string(), Value::from(row.get::<_, String>(4)?));

            let bytes: Vec<u8> = row.get(5)?;
            Ok((
                Document {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    metadata,
                },
                bytes_to_embedding(&bytes),
            ))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ReviewRootError::from)
    }

    /// Read a meta value for a collection
    pub fn get_meta(&self, collection: &str, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM index_meta WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write a meta value for a collection
    pub fn set_meta(&self, collection: &str, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO index_meta (collection, key, value) VALUES (?1, ?2, ?3)",
            params![collection, key, value],
        )?;
        Ok(())
    }

    /// Record how a collection was built
    pub fn record_build(
        &self,
        collection: &str,
        model: &str,
        dimensions: usize,
        fingerprint: Option<&str>,
    ) -> Result<()> {
        self.set_meta(collection, META_MODEL, model)?;
        self.set_meta(collection, META_DIMENSIONS, &dimensions.to_string())?;
        self.set_meta(collection, META_INDEXED_AT, &Utc::now().to_rfc3339())?;
        if let Some(fingerprint) = fingerprint {
            self.set_meta(collection, META_CSV_FINGERPRINT, fingerprint)?;
        }
        Ok(())
    }

    /// Collection statistics for the status command
    pub fn stats(&self, collection: &str) -> Result<CollectionStats> {
        let review_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;

        Ok(CollectionStats {
            collection: collection.to_string(),
            review_count: review_count as usize,
            embedded_count: self.count(collection)?,
            model: self.get_meta(collection, META_MODEL)?,
            dimensions: self
                .get_meta(collection, META_DIMENSIONS)?
                .and_then(|d| d.parse().ok()),
            indexed_at: self.get_meta(collection, META_INDEXED_AT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, text: &str, rating: Option<f64>) -> Document {
        let mut metadata = HashMap::new();
        metadata.insert(
            "rating".to_string(),
            rating.map(Value::from).unwrap_or(Value::Null),
        );
        metadata.insert("date".to_string(), Value::from("2024-01-01"));
        metadata.insert("title".to_string(), Value::from("Title"));
        Document {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
        }
    }

    #[test]
    fn test_insert_and_load_preserves_order_and_metadata() {
        let mut store = ReviewStore::open_in_memory().unwrap();
        let reviews: Vec<_> = (0..12)
            .map(|i| {
                (
                    review(&i.to_string(), &format!("review {}", i), Some(i as f64 % 5.0)),
                    vec![i as f32, 1.0],
                )
            })
            .collect();

        store.insert_reviews("mice", "test-model", &reviews).unwrap();
        assert_eq!(store.count("mice").unwrap(), 12);
        assert_eq!(store.count("keyboards").unwrap(), 0);

        let loaded = store.load_collection("mice").unwrap();
        assert_eq!(loaded.len(), 12);
        // Numeric id order, not lexical ("10" after "9")
        assert_eq!(loaded[10].0.id, "10");
        assert_eq!(loaded[3].0.metadata["rating"], Value::from(3.0));
        assert_eq!(loaded[3].1, vec![3.0, 1.0]);
    }

    #[test]
    fn test_null_rating_survives() {
        let mut store = ReviewStore::open_in_memory().unwrap();
        store
            .insert_reviews("mice", "m", &[(review("0", "no rating", None), vec![1.0])])
            .unwrap();
        let loaded = store.load_collection("mice").unwrap();
        assert_eq!(loaded[0].0.metadata["rating"], Value::Null);
    }

    #[test]
    fn test_clear_and_meta() {
        let mut store = ReviewStore::open_in_memory().unwrap();
        store
            .insert_reviews("mice", "m", &[(review("0", "a", Some(4.0)), vec![1.0])])
            .unwrap();
        store.record_build("mice", "m", 1, Some("abc")).unwrap();

        let stats = store.stats("mice").unwrap();
        assert_eq!(stats.review_count, 1);
        assert_eq!(stats.embedded_count, 1);
        assert_eq!(stats.dimensions, Some(1));
        assert!(stats.indexed_at.is_some());
        assert_eq!(
            store.get_meta("mice", META_CSV_FINGERPRINT).unwrap(),
            Some("abc".to_string())
        );

        store.clear_collection("mice").unwrap();
        assert_eq!(store.count("mice").unwrap(), 0);
        assert_eq!(store.get_meta("mice", META_MODEL).unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("reviews.sqlite");
        let store = ReviewStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
    }
}
