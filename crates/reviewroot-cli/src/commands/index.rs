//! Index command

use crate::app::{IndexArgs, OutputFormat};
use crate::output;
use crate::progress::ProgressReporter;
use anyhow::Result;
use reviewroot_core::{init_index, Config, Embedder, HttpEmbedder, ReviewStore};

pub async fn run(args: IndexArgs, mut config: Config, format: OutputFormat) -> Result<()> {
    if let Some(csv) = args.csv {
        config.index.csv_path = csv;
    }

    let embedder = HttpEmbedder::from_config(config.llm_service.clone())?;
    let mut store = ReviewStore::open(&config.index.db_path)?;

    if format == OutputFormat::Cli {
        println!(
            "Indexing {} into '{}' with {}",
            config.index.csv_path.display(),
            config.index.collection,
            embedder.model_name()
        );
    }

    let progress = ProgressReporter::new();
    let report = init_index(
        &mut store,
        &config.index,
        &embedder,
        args.recreate,
        &|done, total| progress.update(done, total),
    )
    .await;
    progress.finish();
    let report = report?;

    match format {
        OutputFormat::Json => println!("{}", output::to_json(&report)?),
        OutputFormat::Cli => match &report.reason {
            Some(reason) => println!(
                "Indexed {} reviews ({})",
                report.documents, reason
            ),
            None => println!(
                "Index up to date: {} reviews in '{}'",
                report.documents, report.collection
            ),
        },
    }
    Ok(())
}
