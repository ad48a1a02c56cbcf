//! CLI command handlers

pub mod agent;
pub mod ask;
pub mod console;
pub mod index;
pub mod mcp;
pub mod status;
