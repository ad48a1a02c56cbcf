//! Status command

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use reviewroot_core::{Config, ReviewStore};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let store = ReviewStore::open(&config.index.db_path)?;
    let stats = store.stats(&config.index.collection)?;

    match format {
        OutputFormat::Json => {
            println!("{}", output::to_json(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Collection:      {}", stats.collection);
            println!("Database:        {}", config.index.db_path.display());
            println!("Reviews:         {}", stats.review_count);
            println!("Embedded:        {}", stats.embedded_count);
            println!();
            println!("Embeddings:");
            println!(
                "  Model:         {}",
                stats.model.as_deref().unwrap_or("-")
            );
            println!(
                "  Dimensions:    {}",
                stats
                    .dimensions
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!(
                "  Indexed:       {}",
                stats
                    .indexed_at
                    .as_deref()
                    .map(local_time)
                    .unwrap_or_else(|| "never".to_string())
            );
        }
    }
    Ok(())
}

/// Render an RFC 3339 timestamp in local time, falling back to the raw value
fn local_time(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}
