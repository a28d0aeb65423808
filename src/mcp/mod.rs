//! Model Context Protocol tool server.
//!
//! Speaks newline-delimited JSON-RPC 2.0 over stdin/stdout and exposes the
//! transcript and download operations as tools. Stdout carries protocol
//! messages only; logging goes to stderr.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub mod protocol;
pub mod tools;

use protocol::{
    CallToolParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, DEFAULT_PROTOCOL_VERSION,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};

use crate::transcript::FormatOptions;
use crate::youtube::{TranscriptFetcher, YoutubeClient};

pub const SERVER_NAME: &str = "mcp-youtube-transcript";

pub struct McpServer<C> {
    fetcher: TranscriptFetcher<C>,
    defaults: FormatOptions,
}

impl<C: YoutubeClient> McpServer<C> {
    pub fn new(fetcher: TranscriptFetcher<C>, defaults: FormatOptions) -> Self {
        Self { fetcher, defaults }
    }

    /// Serve on the process's stdin/stdout until EOF or Ctrl-C
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tracing::info!("{} listening on stdio", SERVER_NAME);

        tokio::select! {
            result = self.serve(stdin, stdout) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                Ok(())
            }
        }
    }

    /// Read requests line by line from `reader` and write responses to `writer`
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let mut payload = serde_json::to_string(&response)?;
                payload.push('\n');
                writer.write_all(payload.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Client closed the connection");
        Ok(())
    }

    /// Handle one raw message; notifications produce no response
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ))
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            tracing::debug!("Request without jsonrpc 2.0 marker: {:?}", request.jsonrpc);
        }

        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }
        let id = request.id.clone().unwrap_or_default();

        tracing::debug!("Request {}: {}", id, request.method);
        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => Ok(initialize_result(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::tool_definitions() })),
            "tools/call" => self.call_tool(params).await,
            _ => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            )),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;

        let result = match params.name.as_str() {
            tools::GET_TRANSCRIPTS => {
                let args = tools::parse_args(&params.name, params.arguments)?;
                tools::get_transcripts(&self.fetcher, &self.defaults, args).await?
            }
            tools::DOWNLOAD_VIDEO => {
                let args = tools::parse_args(&params.name, params.arguments)?;
                tools::download_video(&self.fetcher, args).await?
            }
            other => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", other)));
            }
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal(e.to_string()))
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": "Extract transcripts from YouTube videos and download video files.",
    })
}
