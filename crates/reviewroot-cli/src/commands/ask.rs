//! Ask command: direct question answering

use crate::app::AskArgs;
use anyhow::Result;
use reviewroot_core::{answer_question, AppContext, Config};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(args: AskArgs, config: Config) -> Result<()> {
    let ctx = AppContext::from_config(config)?;

    if !args.question.is_empty() {
        let question = args.question.join(" ");
        println!("{}", ask(&ctx, &question, args.k).await);
        return Ok(());
    }

    println!("Ask a question about the reviews (q to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nQuestion: ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        match question {
            "" => continue,
            "q" | "quit" | "exit" => break,
            _ => println!("\n{}", ask(&ctx, question, args.k).await),
        }
    }
    Ok(())
}

async fn ask(ctx: &AppContext, question: &str, k: usize) -> String {
    answer_question(ctx.generator.as_ref(), ctx.retriever.as_ref(), question, k).await
}
