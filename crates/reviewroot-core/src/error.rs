//! Error types for reviewroot

use thiserror::Error;

/// Result type alias using ReviewRootError
pub type Result<T> = std::result::Result<T, ReviewRootError>;

/// Error type alias for convenience
pub type Error = ReviewRootError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for reviewroot
#[derive(Debug, Error)]
pub enum ReviewRootError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ReviewRootError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => exit_codes::NOT_FOUND,
            Self::MissingColumns(_) | Self::Config(_) | Self::InvalidInput(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let missing = ReviewRootError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "reviews.csv",
        ));
        assert_eq!(missing.exit_code(), exit_codes::NOT_FOUND);

        let columns = ReviewRootError::MissingColumns(vec!["Rating".to_string()]);
        assert_eq!(columns.exit_code(), exit_codes::INVALID_INPUT);
        assert_eq!(
            columns.to_string(),
            "Missing required columns: [\"Rating\"]"
        );

        assert_eq!(
            ReviewRootError::Llm("down".to_string()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
