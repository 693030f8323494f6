//! Newline-delimited JSON-RPC 2.0 over a reader/writer pair. One request is
//! handled end to end before the next line is read.

use crate::dispatcher::ToolDispatcher;
use gmail_mcp_core::mcp::{
    error_codes, ErrorPayload, JsonRpcRequest, JsonRpcResponse, ResultPayload, ToolResultBody,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const SERVER_NAME: &str = "gmail-mcp";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Serves until `reader` reaches EOF. A line that is not UTF-8 gets a
    /// parse error and serving continues.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let out = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim_end_matches(['\n', '\r'])).await,
                Err(e) => {
                    tracing::warn!(event = "parse_error", error = %e);
                    Some(error_line(
                        Value::Null,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: input is not valid UTF-8 ({})", e),
                    ))
                }
            };
            if let Some(out) = out {
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        tracing::info!(event = "input_closed");
        Ok(())
    }

    /// Returns the response line, or `None` for notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<String> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(event = "parse_error", error = %e);
                return Some(error_line(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };
        let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);
        let req: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(error_line(
                    id_hint,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        };

        if req.is_notification() {
            tracing::debug!(event = "notification", method = %req.method);
            return None;
        }
        let id = req.id.clone().unwrap_or(Value::Null);

        match req.method.as_str() {
            "initialize" => {
                let version = req
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Some(result_line(
                    id,
                    json!({
                        "protocolVersion": version,
                        "capabilities": { "tools": {} },
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        }
                    }),
                ))
            }
            "ping" => Some(result_line(id, json!({}))),
            "tools/list" => Some(result_line(
                id,
                json!({ "tools": self.dispatcher.list_tools() }),
            )),
            "tools/call" => {
                let Some(params) = req.tool_params() else {
                    return Some(error_line(
                        id,
                        error_codes::INVALID_PARAMS,
                        "tools/call requires params { name, arguments }",
                    ));
                };
                let body = match self.dispatcher.call(&params.name, &params.arguments).await {
                    Ok(value) => {
                        let text = serde_json::to_string_pretty(&value).unwrap_or_default();
                        let mut body = ToolResultBody::text(text);
                        body.structured_content = Some(value);
                        body
                    }
                    Err(e) => ToolResultBody::error(&e.to_string(), e.to_json()),
                };
                Some(JsonRpcResponse::new(id, ResultPayload { result: body }).to_line())
            }
            other => Some(error_line(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }
}

fn result_line(id: Value, result: Value) -> String {
    JsonRpcResponse::new(id, ResultPayload { result }).to_line()
}

fn error_line(id: Value, code: i32, message: impl Into<String>) -> String {
    JsonRpcResponse::new(id, ErrorPayload::new(code, message)).to_line()
}
