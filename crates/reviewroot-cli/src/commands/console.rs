//! Interactive console backed by a spawned tool server

use crate::output;
use anyhow::{anyhow, Result};
use reviewroot_core::{Config, PipelineResult, ToolCall};
use reviewroot_mcp::protocol::ToolResult;
use reviewroot_mcp::{spawn_server, ProcessClient};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reviews requested by `process` when no count is given
const DEFAULT_PROCESS_K: i64 = 5;

const HELP: &str = "\
Commands:
  test                      Check the server connection
  list                      List the server's tools
  agent <query>             Run the full pipeline for a query
  extract <query>           Extract keywords from a query
  process [keywords] [k]    Retrieve k reviews for comma-separated keywords
                            (defaults to the last extracted keywords), then
                            summarize them and compute statistics
  help                      Show this help
  quit                      Exit";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Test,
    List,
    Help,
    Quit,
    Agent(String),
    Extract(String),
    Process {
        keywords: Option<Vec<String>>,
        k: i64,
    },
}

impl ConsoleCommand {
    /// Parse a non-empty input line
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "test" => Ok(Self::Test),
            "list" => Ok(Self::List),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "agent" | "extract" if rest.is_empty() => {
                Err(format!("Usage: {} <query>", command))
            }
            "agent" => Ok(Self::Agent(rest.to_string())),
            "extract" => Ok(Self::Extract(rest.to_string())),
            "process" => Ok(parse_process(rest)),
            _ => Err(format!("Command not recognized: {}", command)),
        }
    }
}

fn parse_process(rest: &str) -> ConsoleCommand {
    let mut words: Vec<&str> = rest.split_whitespace().collect();

    let k = match words.last().and_then(|w| w.parse::<i64>().ok()) {
        Some(k) => {
            words.pop();
            k
        }
        None => DEFAULT_PROCESS_K,
    };

    let keywords: Vec<String> = words
        .join(" ")
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    ConsoleCommand::Process {
        keywords: if keywords.is_empty() {
            None
        } else {
            Some(keywords)
        },
        k,
    }
}

struct Console {
    client: ProcessClient,
    last_keywords: Vec<String>,
}

pub async fn run(config: &Config, config_path: Option<&Path>) -> Result<()> {
    let exe = std::env::current_exe()?;
    let mut args = vec!["mcp".to_string()];
    if let Some(path) = config_path {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    args.push("--min-similarity".to_string());
    args.push(config.retrieval.min_similarity.to_string());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    println!("Starting tool server...");
    let (mut child, client) = spawn_server(&exe, &args, config.timeouts.clone())?;

    let mut console = Console {
        client,
        last_keywords: Vec::new(),
    };
    console.client.initialize().await?;
    println!("Connected.\n");
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ConsoleCommand::parse(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        if let Err(e) = console.execute(command).await {
            println!("Error: {:#}", e);
        }
    }

    println!("Shutting down server...");
    drop(console);
    child.wait().await?;
    Ok(())
}

impl Console {
    async fn execute(&mut self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Test => {
                let tools = self.client.list_tools().await?;
                println!("Server ready, {} tools available", tools.len());
            }
            ConsoleCommand::List => {
                let tools = self.client.list_tools().await?;
                println!("Found {} tools", tools.len());
                for tool in tools {
                    println!("\n  {}", tool.name);
                    println!("    {}", tool.description);
                }
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => {}
            ConsoleCommand::Agent(query) => {
                println!("Processing query: '{}'", query);
                let result = self
                    .call("agent", json!({ "user_query": query }))
                    .await?;
                match serde_json::from_str::<PipelineResult>(&result.text()) {
                    Ok(pipeline) => println!(
                        "{}",
                        serde_json::to_string_pretty(&output::display_pipeline(&pipeline))?
                    ),
                    Err(_) => println!("{}", output::display_text(&result.text())),
                }
            }
            ConsoleCommand::Extract(query) => {
                println!("Extracting keywords from: '{}'", query);
                let result = self
                    .call("extract_important_keywords", json!({ "user_query": query }))
                    .await?;
                if result.is_error() {
                    println!("{}", result.text());
                } else {
                    self.last_keywords = serde_json::from_str(&result.text())?;
                    println!("Keywords: {}", self.last_keywords.join(", "));
                }
            }
            ConsoleCommand::Process { keywords, k } => {
                let keywords = match keywords {
                    Some(keywords) => keywords,
                    None if !self.last_keywords.is_empty() => self.last_keywords.clone(),
                    None => {
                        println!("No keywords given and none extracted yet");
                        return Ok(());
                    }
                };
                self.process(keywords, k).await?;
            }
        }
        Ok(())
    }

    async fn process(&mut self, keywords: Vec<String>, k: i64) -> Result<()> {
        println!("Retrieving {} reviews for: {}", k, keywords.join(", "));
        let retrieved = self
            .call(
                "retrieve_useful_reviews",
                json!({ "keywords": keywords, "k": k }),
            )
            .await?;
        if retrieved.is_error() {
            println!("{}", retrieved.text());
            return Ok(());
        }

        let reviews: Value = serde_json::from_str(&retrieved.text())?;
        let summary = self
            .call("summarize_reviews", json!({ "reviews": reviews }))
            .await?;
        let statistics = self
            .call("get_reviews_statistics", json!({ "reviews": reviews }))
            .await?;

        let count = reviews.as_array().map(Vec::len).unwrap_or(0);
        println!("Found {} reviews:", count);
        let report = json!({
            "reviews": reviews,
            "summary": output::display_text(&summary.text()),
            "statistics": output::display_text(&statistics.text()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    async fn call(&mut self, name: &str, arguments: Value) -> Result<ToolResult> {
        let call = ToolCall::parse(name, Some(arguments)).map_err(|e| anyhow!(e.to_string()))?;
        self.client.call_tool(&call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ConsoleCommand::parse("list"), Ok(ConsoleCommand::List));
        assert_eq!(ConsoleCommand::parse("  test "), Ok(ConsoleCommand::Test));
        assert_eq!(ConsoleCommand::parse("quit"), Ok(ConsoleCommand::Quit));
        assert_eq!(
            ConsoleCommand::parse("agent quiet wireless mouse"),
            Ok(ConsoleCommand::Agent("quiet wireless mouse".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_incomplete() {
        assert!(ConsoleCommand::parse("frobnicate now")
            .unwrap_err()
            .contains("not recognized"));
        assert_eq!(
            ConsoleCommand::parse("extract"),
            Err("Usage: extract <query>".to_string())
        );
    }

    #[test]
    fn test_parse_process() {
        assert_eq!(
            ConsoleCommand::parse("process mouse, wireless 3"),
            Ok(ConsoleCommand::Process {
                keywords: Some(vec!["mouse".to_string(), "wireless".to_string()]),
                k: 3,
            })
        );
        assert_eq!(
            ConsoleCommand::parse("process battery life"),
            Ok(ConsoleCommand::Process {
                keywords: Some(vec!["battery life".to_string()]),
                k: DEFAULT_PROCESS_K,
            })
        );
        assert_eq!(
            ConsoleCommand::parse("process 8"),
            Ok(ConsoleCommand::Process {
                keywords: None,
                k: 8,
            })
        );
        assert_eq!(
            ConsoleCommand::parse("process"),
            Ok(ConsoleCommand::Process {
                keywords: None,
                k: DEFAULT_PROCESS_K,
            })
        );
    }
}
