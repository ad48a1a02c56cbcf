//! Agent command: run the review pipeline locally

use crate::app::{AgentArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use reviewroot_core::{AppContext, Config};

pub async fn run(args: AgentArgs, config: Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let ctx = AppContext::from_config(config)?;

    let result = ctx.tools.orchestrator().run(&query, args.k).await;
    println!("{}", output::format_pipeline(&result, format)?);
    Ok(())
}
