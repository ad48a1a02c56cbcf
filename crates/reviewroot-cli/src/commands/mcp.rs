//! Tool server command

use anyhow::Result;
use reviewroot_core::{AppContext, Config};

pub async fn run(config: Config) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    tracing::info!("Serving review tools on stdio");
    reviewroot_mcp::start_server(&ctx).await
}
