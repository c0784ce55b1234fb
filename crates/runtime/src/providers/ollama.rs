//! Ollama chat backend.

use std::time::Duration;

use crate::model::{
    Backend, FunctionCall, Message, ModelError, ModelRequest, ModelResponse, Role, ToolCall,
    ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a local Ollama listens by default.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default bound on one chat call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    stream: bool,
    options: ApiOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Debug, Serialize)]
struct ApiOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ApiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function: Option<ApiFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ApiFunctionSpec,
}

#[derive(Debug, Serialize)]
struct ApiFunctionSpec {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    message: ApiMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaBackendBuilder {
    base_url: String,
    timeout: Duration,
}

impl Default for OllamaBackendBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OllamaBackendBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OllamaBackend, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ModelError::Config(e.to_string()))?;

        Ok(OllamaBackend {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Ollama `/api/chat` backend.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn builder() -> OllamaBackendBuilder {
        OllamaBackendBuilder::default()
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        ApiMessage {
            role: Self::role_to_api(msg.role).to_string(),
            content: msg.content.clone(),
            tool_calls: msg
                .tool_calls
                .iter()
                .map(|call| ApiToolCall {
                    id: Some(call.id.clone()),
                    function: call.function.as_ref().map(|f| ApiFunctionCall {
                        name: f.name.clone(),
                        arguments: f.arguments.clone(),
                    }),
                })
                .collect(),
            tool_call_id: msg.tool_call_id.clone(),
            tool_name: msg.name.clone(),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            kind: "function",
            function: ApiFunctionSpec {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.schema.clone(),
            },
        }
    }

    /// Whatever role the backend reports, the reply is the assistant's.
    /// Calls without an id get a fresh one so results can be correlated.
    fn response_to_message(msg: ApiMessage) -> Message {
        let tool_calls = msg
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
                function: call.function.map(|f| FunctionCall {
                    name: f.name,
                    arguments: f.arguments,
                }),
            })
            .collect();

        Message::assistant(msg.content).with_tool_calls(tool_calls)
    }
}

impl std::fmt::Display for OllamaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ollama({})", self.base_url)
    }
}

impl Backend for OllamaBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = ApiRequest {
            model: request.model,
            messages: request.messages.iter().map(Self::message_to_api).collect(),
            stream: false,
            options: ApiOptions {
                temperature: request.options.temperature,
            },
            tools: request.options.tools.iter().map(Self::tool_to_api).collect(),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header("accept", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let usage = Usage {
            input_tokens: api_response.prompt_eval_count,
            output_tokens: api_response.eval_count,
        };
        let message = Self::response_to_message(api_response.message);

        Ok(ModelResponse { message, usage })
    }
}
