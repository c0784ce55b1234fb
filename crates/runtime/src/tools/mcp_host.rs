//! MCP-backed tool invoker.

use std::time::Duration;

use mcp::{Server, ServerConfig};
use serde_json::json;

use super::registry::{self, CITY_PARAM};
use super::types::is_no_city;
use super::{ToolArguments, ToolError, ToolInvoker};

/// Default bound on one whole tool session (spawn, handshake, call, teardown).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Invokes tools on an MCP server spawned fresh for every call.
///
/// Sessions are never reused: each call spawns the server, runs the
/// initialize handshake, calls the tool and shuts the server down.
#[derive(Debug, Clone)]
pub struct McpInvoker {
    config: ServerConfig,
    timeout: Duration,
}

impl McpInvoker {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    /// Bound each session to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call_once(&self, name: &str, city: &str) -> Result<String, ToolError> {
        let server = Server::spawn(self.config.clone())
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        let outcome = async {
            server.initialize().await?;
            server
                .call_tool(name, Some(json!({ CITY_PARAM: city })))
                .await
        }
        .await;

        if let Err(e) = server.shutdown().await {
            tracing::warn!(server = %self.config.name, error = %e, "tool server shutdown failed");
        }

        outcome
            .map(|result| result.joined_text())
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}

impl ToolInvoker for McpInvoker {
    async fn invoke(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> Result<Option<String>, ToolError> {
        if !registry::tools().iter().any(|tool| tool.name == name) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        let Some(city) = arguments.city().filter(|city| !is_no_city(city)) else {
            tracing::debug!(tool = name, "no usable city, skipping executor");
            return Ok(None);
        };

        // Dropping the session future on timeout kills the child process.
        tokio::time::timeout(self.timeout, self.call_once(name, city))
            .await
            .map_err(|_| ToolError::Timeout(self.timeout.as_millis() as u64))?
            .map(Some)
    }
}
