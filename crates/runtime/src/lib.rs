//! Nimbus runtime: weather-aware chat turns over a local model.
//!
//! The runtime is organized around these concepts:
//!
//! - **Backend**: a chat model endpoint ([`OllamaBackend`] in production).
//! - **Intent**: a keyword and template classifier that decides whether a
//!   turn is worth offering the weather tool for.
//! - **ToolInvoker**: runs one tool call; [`McpInvoker`] spawns a fresh MCP
//!   server per call.
//! - **Orchestrator**: first pass, tool dispatch, second pass.
//! - **Session**: the conversation history across turns.
//!
//! # Example
//!
//! ```no_run
//! use mcp::ServerConfig;
//! use runtime::{McpInvoker, OllamaBackend, Orchestrator, Session, ToolPolicy};
//!
//! # async fn example() -> Result<(), runtime::ModelError> {
//! let backend = OllamaBackend::builder().build()?;
//! let invoker = McpInvoker::new(ServerConfig::new("weather", "nimbus-weather"));
//! let mut session = Session::new(Orchestrator::new(backend, invoker, "llama3.2"));
//!
//! let answer = session.chat("What's the weather in London today?", ToolPolicy::Auto).await;
//! println!("{}", answer.text());
//! # Ok(())
//! # }
//! ```

pub mod intent;
pub mod model;
mod orchestrator;
pub mod providers;
mod session;
pub mod tools;

pub use model::{
    Backend, GenerationOptions, Message, ModelError, ModelRequest, ModelResponse, Role, ToolCall,
    ToolSpec, Usage,
};
pub use orchestrator::{Answer, DEFAULT_BACKEND_TIMEOUT, Orchestrator, ToolPolicy};
pub use providers::{OllamaBackend, OllamaBackendBuilder};
pub use session::{Conversation, Session};
pub use tools::{McpInvoker, ToolArguments, ToolError, ToolInvoker};
