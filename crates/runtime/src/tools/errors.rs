use thiserror::Error;

/// Errors from extracting or executing a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool call has no function")]
    MissingFunction,
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("no city in arguments")]
    MissingCity,
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("timeout after {0}ms")]
    Timeout(u64),
    #[error("execution failed: {0}")]
    Execution(String),
}
