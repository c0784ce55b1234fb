//! Chat protocol types and backend trait.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    ANSWER_TEMPERATURE, Backend, FunctionCall, GenerationOptions, Message, ModelRequest,
    ModelResponse, Role, TOOL_TEMPERATURE, ToolCall, ToolSpec, Usage,
};
