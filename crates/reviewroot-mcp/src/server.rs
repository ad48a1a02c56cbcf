//! MCP server implementation

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use reviewroot_core::AppContext;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "reviews-agent";

pub struct McpServer<'a> {
    ctx: &'a AppContext,
    initialized: bool,
}

impl<'a> McpServer<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            initialized: false,
        }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&mut self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited requests from `reader` until EOF
    ///
    /// Each response is written and flushed before the next line is read.
    pub async fn serve<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(trimmed).await {
                write_response(&mut writer, &response).await?;
            }
        }

        tracing::debug!("Client closed the connection");
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    &format!("Parse error: {}", e),
                ))
            }
        };

        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    &format!("Invalid request: {}", e),
                ))
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        Some(self.handle_request(&request).await)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::debug!("Client finished initialization"),
            other => tracing::debug!("Ignoring notification {}", other),
        }
    }

    async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id.clone(), json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        self.initialized = true;
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({ "tools": tools::tool_definitions() }),
        )
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        if !self.initialized {
            return JsonRpcResponse::error(
                request.id.clone(),
                error_codes::NOT_INITIALIZED,
                "Server not initialized",
            );
        }

        let call = match tools::parse_call(&request.params) {
            Ok(call) => call,
            Err(e) => {
                tracing::debug!("Rejected tools/call: {}", e);
                return JsonRpcResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    &e.to_string(),
                );
            }
        };

        tracing::info!("Calling tool {}", call.name());
        let result = tools::handle_call(&self.ctx.tools, call).await;
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INTERNAL_ERROR,
                &format!("Failed to encode tool result: {}", e),
            ),
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Serve the review tools on stdin/stdout
pub async fn start_server(ctx: &AppContext) -> Result<()> {
    let mut server = McpServer::new(ctx);
    server.run().await
}
