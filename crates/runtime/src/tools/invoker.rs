//! Tool invoker trait.

use crate::tools::{ToolArguments, ToolError};
use std::future::Future;

/// Trait for tool execution backends.
///
/// This is the boundary between the orchestration loop and side effects.
/// Implementations return the executor's raw text, or `None` when the call
/// was deliberately skipped without contacting the executor (the "nowhere"
/// placeholder city). An empty `Some` is a real, empty result.
pub trait ToolInvoker: Send + Sync {
    /// Invoke the tool `name`.
    fn invoke(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> impl Future<Output = Result<Option<String>, ToolError>> + Send;
}
