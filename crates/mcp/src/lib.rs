//! MCP (Model Context Protocol) over stdio.
//!
//! The client side spawns a tool server as a child process and talks to it
//! through a [`Server`] handle. The serving side lets a binary expose tools
//! by implementing [`ToolService`] and calling [`serve_stdio`].
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Server, ServerConfig};
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = ServerConfig::new("weather", "nimbus-weather");
//!
//! let server = Server::spawn(config).await?;
//! server.initialize().await?;
//!
//! let result = server
//!     .call_tool(
//!         "get_todays_weather",
//!         Some(serde_json::json!({ "city_name": "london" })),
//!     )
//!     .await?;
//! println!("{}", result.joined_text());
//!
//! server.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod serve;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, INTERNAL_ERROR, INVALID_PARAMS, Implementation,
    IncomingMessage, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, RequestId,
    ServerCapabilities, Tool, ToolContent,
};
pub use serve::{ToolService, handle, serve, serve_stdio};
pub use server::{DEFAULT_TIMEOUT, MAX_OUTPUT_SIZE, Server, ServerConfig};
