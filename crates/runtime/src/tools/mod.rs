//! Tool descriptors, call extraction and MCP-backed invocation.

pub mod errors;
mod invoker;
mod mcp_host;
pub mod registry;
mod types;

pub use errors::ToolError;
pub use invoker::ToolInvoker;
pub use mcp_host::{DEFAULT_SESSION_TIMEOUT, McpInvoker};
pub use registry::{CITY_PARAM, WEATHER_TOOL, tools};
pub use types::{
    CITY_ALIAS, NO_CITY_SENTINEL, ToolArguments, ToolInvocation, ToolResult, is_no_city,
};
