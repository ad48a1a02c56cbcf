//! Line-protocol client for the review tool server
//!
//! One request is in flight at a time; responses are matched by id and
//! anything else on the wire (notifications, late replies to timed-out
//! calls) is skipped.

use crate::protocol::*;
use anyhow::{anyhow, bail, Context, Result};
use reviewroot_core::{ReviewRootError, TimeoutConfig, ToolCall};
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub struct McpClient<R, W> {
    reader: BufReader<R>,
    /// Bytes of the line being read; kept when a timed-out read is dropped
    line: Vec<u8>,
    writer: W,
    next_id: u64,
    timeouts: TimeoutConfig,
}

/// Client talking to a spawned server process over its stdio
pub type ProcessClient = McpClient<ChildStdout, ChildStdin>;

impl<R, W> McpClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, timeouts: TimeoutConfig) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
            writer,
            next_id: 1,
            timeouts,
        }
    }

    /// Handshake: `initialize` then the `notifications/initialized` notice
    pub async fn initialize(&mut self) -> Result<Value> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "reviewroot-console",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        let result = self
            .request("initialize", params, self.timeouts.tool_secs)
            .await?;
        self.notify("notifications/initialized").await?;
        Ok(result)
    }

    pub async fn list_tools(&mut self) -> Result<Vec<ToolDefinition>> {
        let result = self
            .request("tools/list", Value::Null, self.timeouts.tool_secs)
            .await?;
        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| anyhow!("tools/list response without tools"))?;
        Ok(serde_json::from_value(tools)?)
    }

    /// Call a tool; `agent` gets the longer timeout
    pub async fn call_tool(&mut self, call: &ToolCall) -> Result<ToolResult> {
        let timeout_secs = match call {
            ToolCall::Agent(_) => self.timeouts.agent_secs,
            _ => self.timeouts.tool_secs,
        };
        let params = serde_json::to_value(call)?;
        let result = self.request("tools/call", params, timeout_secs).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn ping(&mut self) -> Result<()> {
        self.request("ping", Value::Null, self.timeouts.tool_secs)
            .await
            .map(|_| ())
    }

    async fn notify(&mut self, method: &str) -> Result<()> {
        self.send(&JsonRpcRequest::notification(method)).await
    }

    /// Send a request and wait at most `timeout_secs` for its response
    pub async fn request(&mut self, method: &str, params: Value, timeout_secs: u64) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.send(&JsonRpcRequest::new(id, method, params)).await?;

        let response = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.read_response(id),
        )
        .await
        .map_err(|_| {
            tracing::warn!("{} (id {}) timed out after {}s", method, id, timeout_secs);
            anyhow::Error::new(ReviewRootError::Timeout(timeout_secs))
        })??;

        if let Some(error) = response.error {
            bail!("{} failed ({}): {}", method, error.code, error.message);
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn send(&mut self, request: &JsonRpcRequest) -> Result<()> {
        let json = serde_json::to_string(request)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self, id: u64) -> Result<JsonRpcResponse> {
        let expected = Value::from(id);

        loop {
            // read_until appends, so a partial line survives cancellation
            if self.reader.read_until(b'\n', &mut self.line).await? == 0 {
                bail!("Server closed the connection");
            }
            let line = std::mem::take(&mut self.line);

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let response: JsonRpcResponse = match serde_json::from_slice(&line) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Skipping unreadable line from server: {}", e);
                    continue;
                }
            };

            match response.id {
                Some(ref rid) if *rid == expected => return Ok(response),
                _ => tracing::debug!("Skipping message with id {:?}", response.id),
            }
        }
    }
}

/// Spawn `program args...` and connect to its stdio
///
/// The child is killed when the returned handle is dropped.
pub fn spawn_server(
    program: &Path,
    args: &[&str],
    timeouts: TimeoutConfig,
) -> Result<(Child, ProcessClient)> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start {}", program.display()))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("Server stdin unavailable"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Server stdout unavailable"))?;

    Ok((child, McpClient::new(stdout, stdin, timeouts)))
}
