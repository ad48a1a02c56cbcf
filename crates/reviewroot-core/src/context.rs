//! Application context shared by the CLI and the tool server

use crate::config::Config;
use crate::error::Result;
use crate::index::{ReviewIndex, ReviewStore, Retriever};
use crate::llm::{Embedder, Generator, HttpEmbedder, HttpGenerator};
use crate::tools::{Orchestrator, ReviewTools};
use std::sync::Arc;

/// Everything a review operation needs, built once at startup
///
/// Read-only after construction.
pub struct AppContext {
    pub config: Config,
    pub generator: Arc<dyn Generator>,
    pub retriever: Arc<dyn Retriever>,
    pub tools: ReviewTools,
}

impl AppContext {
    pub fn new(
        config: Config,
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        let orchestrator =
            Orchestrator::new(generator.clone(), retriever.clone(), &config.retrieval);
        Self {
            config,
            generator,
            retriever,
            tools: ReviewTools::new(orchestrator),
        }
    }

    /// HTTP LLM service plus the review index stored at `config.index.db_path`
    ///
    /// The index must already be built; see [`crate::index::init_index`].
    pub fn from_config(config: Config) -> Result<Self> {
        let generator: Arc<dyn Generator> =
            Arc::new(HttpGenerator::from_config(config.llm_service.clone())?);
        let embedder: Arc<dyn Embedder> =
            Arc::new(HttpEmbedder::from_config(config.llm_service.clone())?);

        let store = ReviewStore::open(&config.index.db_path)?;
        let index = ReviewIndex::load(&store, &config.index.collection, embedder)?;
        if index.is_empty() {
            tracing::warn!(
                "Collection '{}' is empty; run `reviewroot index` first",
                config.index.collection
            );
        }

        Ok(Self::new(config, generator, Arc::new(index)))
    }
}
