//! Serving side of an MCP stdio session.
//!
//! A tool provider implements [`ToolService`]; [`serve`] reads
//! newline-delimited JSON-RPC from a reader and writes responses to a writer
//! until the peer closes its end.

use std::future::Future;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::protocol::{
    CallToolParams, CallToolResult, Implementation, IncomingMessage, InitializeResult,
    JsonRpcError, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, ServerCapabilities, Tool,
    ToolsCapability,
};

/// A provider of MCP tools.
pub trait ToolService: Send + Sync {
    /// Name and version reported during initialize.
    fn info(&self) -> Implementation;

    /// Tools reported by `tools/list`.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool.
    ///
    /// Return `Err` for protocol-level problems (unknown tool, bad params);
    /// failures of the tool itself belong in [`CallToolResult::error`].
    fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, JsonRpcError>> + Send;
}

/// Serve MCP over the process's stdin/stdout.
pub async fn serve_stdio<S: ToolService>(service: &S) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(service, stdin, tokio::io::stdout()).await
}

/// Serve MCP over an arbitrary line-oriented transport.
pub async fn serve<S, R, W>(service: &S, reader: R, mut writer: W) -> Result<()>
where
    S: ToolService,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message: IncomingMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable message");
                let error = JsonRpcError::parse_error(e.to_string());
                write_response(&mut writer, &JsonRpcResponse::unidentified(error)).await?;
                continue;
            }
        };

        if let Some(response) = handle(service, message).await {
            write_response(&mut writer, &response).await?;
        }
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut out = serde_json::to_string(response)?;
    out.push('\n');
    writer.write_all(out.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Dispatch one message. Notifications produce no response.
pub async fn handle<S: ToolService>(
    service: &S,
    message: IncomingMessage,
) -> Option<JsonRpcResponse> {
    let Some(id) = message.id else {
        tracing::debug!(method = %message.method, "notification");
        return None;
    };

    let outcome = dispatch(service, &message.method, message.params).await;
    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    })
}

async fn dispatch<S: ToolService>(
    service: &S,
    method: &str,
    params: Option<Value>,
) -> std::result::Result<Value, JsonRpcError> {
    match method {
        "initialize" => to_value(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: service.info(),
        }),
        "ping" => Ok(Value::Object(Default::default())),
        "tools/list" => to_value(ListToolsResult {
            tools: service.tools(),
        }),
        "tools/call" => {
            let params: CallToolParams = params
                .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
                .and_then(|p| {
                    serde_json::from_value(p)
                        .map_err(|e| JsonRpcError::invalid_params(e.to_string()))
                })?;
            tracing::info!(tool = %params.name, "tools/call");
            to_value(service.call_tool(&params.name, params.arguments).await?)
        }
        other => Err(JsonRpcError::method_not_found(other)),
    }
}

fn to_value(value: impl serde::Serialize) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(e.to_string()))
}
