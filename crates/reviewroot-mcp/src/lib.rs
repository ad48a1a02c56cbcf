//! Reviewroot MCP Server
//!
//! Newline-delimited JSON-RPC exposure of the review tools, plus the client
//! used by the interactive console.

pub mod client;
pub mod protocol;
mod server;
pub mod tools;

pub use client::{spawn_server, McpClient, ProcessClient};
pub use server::{start_server, McpServer, SERVER_NAME};
