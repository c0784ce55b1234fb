//! Turn orchestration.
//!
//! One turn runs through a fixed sequence:
//!
//! 1. decide whether to offer tools (forced by the caller, or classified);
//! 2. first pass against the backend;
//! 3. if the reply requests tools, dispatch each call independently;
//! 4. fold any results into an augmented history;
//! 5. second, tool-free pass that produces the answer.
//!
//! Tool failures are contained per call. Backend failures are contained per
//! turn and come back as [`Answer::Failed`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::intent;
use crate::model::{Backend, GenerationOptions, Message, ModelError, ModelRequest, ToolSpec};
use crate::tools::{self, ToolInvocation, ToolInvoker, ToolResult};

/// Default bound on one backend pass.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Whether tools are offered for a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPolicy {
    /// Always offer tools.
    On,
    /// Never offer tools.
    Off,
    /// Offer tools when the latest user message looks like a weather question.
    #[default]
    Auto,
}

impl fmt::Display for ToolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for ToolPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown tool policy '{other}' (expected on, off or auto)")),
        }
    }
}

/// Outcome of a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// The backend produced an answer.
    Ok(Message),
    /// The backend failed; the turn could not be answered.
    Failed(String),
}

impl Answer {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// User-facing text.
    pub fn text(&self) -> String {
        match self {
            Self::Ok(message) => message.content.clone(),
            Self::Failed(reason) => format!("Sorry, I couldn't get an answer: {reason}"),
        }
    }

    /// Collapse into an assistant message.
    pub fn into_message(self) -> Message {
        match self {
            Self::Ok(message) => message,
            failed @ Self::Failed(_) => Message::assistant(failed.text()),
        }
    }
}

/// Drives one turn against a backend and a tool invoker.
pub struct Orchestrator<B, T> {
    backend: B,
    invoker: T,
    model: String,
    tools: Vec<ToolSpec>,
    backend_timeout: Duration,
}

impl<B: Backend, T: ToolInvoker> Orchestrator<B, T> {
    /// Create an orchestrator that asks `model` on `backend` and runs tools
    /// through `invoker`, offering the registered tool descriptors.
    pub fn new(backend: B, invoker: T, model: impl Into<String>) -> Self {
        Self {
            backend,
            invoker,
            model: model.into(),
            tools: tools::tools().to_vec(),
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// Replace the advertised tool descriptors.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Bound each backend pass to `timeout`.
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn invoker(&self) -> &T {
        &self.invoker
    }

    /// Answer the latest turn of `history`. Never fails.
    pub async fn respond(&self, history: &[Message], policy: ToolPolicy) -> Answer {
        match self.run_turn(history, policy).await {
            Ok(message) => Answer::Ok(message),
            Err(e) => {
                tracing::warn!(error = %e, "chat backend failed");
                Answer::Failed(e.to_string())
            }
        }
    }

    async fn run_turn(
        &self,
        history: &[Message],
        policy: ToolPolicy,
    ) -> Result<Message, ModelError> {
        let use_tools = match policy {
            ToolPolicy::On => true,
            ToolPolicy::Off => false,
            ToolPolicy::Auto => intent::classify_latest(history),
        };
        tracing::debug!(%policy, use_tools, "tool decision");

        let options = if use_tools {
            GenerationOptions::tool_selection(&self.tools)
        } else {
            GenerationOptions::answer()
        };

        let first = self.complete(history, &options).await?;
        if !use_tools || !first.has_tool_calls() {
            return Ok(first);
        }

        let results = self.dispatch(&first).await;
        if results.is_empty() {
            tracing::debug!("no tool produced a result, keeping first pass");
            return Ok(first);
        }

        let augmented = fold(history, &first, results);
        self.complete(&augmented, &GenerationOptions::answer()).await
    }

    /// Run each requested call in order; skipped or failed calls contribute
    /// nothing.
    async fn dispatch(&self, reply: &Message) -> Vec<ToolResult> {
        let mut results = Vec::new();

        for call in &reply.tool_calls {
            let invocation = match ToolInvocation::try_from(call) {
                Ok(invocation) => invocation,
                Err(e) => {
                    tracing::debug!(call = %call.id, error = %e, "skipping malformed tool call");
                    continue;
                }
            };

            tracing::info!(tool = %invocation.name, call = %invocation.id, "invoking tool");
            match self
                .invoker
                .invoke(&invocation.name, &invocation.arguments)
                .await
            {
                Ok(None) => {
                    tracing::debug!(call = %invocation.id, "tool call skipped");
                }
                Ok(Some(content)) => results.push(ToolResult {
                    tool_call_id: invocation.id,
                    tool_name: invocation.name,
                    content,
                }),
                Err(e) => {
                    tracing::warn!(tool = %invocation.name, error = %e, "tool call failed");
                }
            }
        }

        results
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ModelError> {
        let request = ModelRequest {
            model: &self.model,
            messages,
            options,
        };

        let response = tokio::time::timeout(self.backend_timeout, self.backend.call(request))
            .await
            .map_err(|_| ModelError::Timeout(self.backend_timeout.as_millis() as u64))??;

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            tool_calls = response.message.tool_calls.len(),
            "backend pass"
        );
        Ok(response.message)
    }
}

/// History, then the assistant's tool-call message exactly as received, then
/// one tool message per result in production order.
fn fold(history: &[Message], reply: &Message, results: Vec<ToolResult>) -> Vec<Message> {
    let mut augmented = Vec::with_capacity(history.len() + 1 + results.len());
    augmented.extend_from_slice(history);
    augmented.push(
        Message::assistant(reply.content.clone()).with_tool_calls(reply.tool_calls.clone()),
    );
    augmented.extend(results.into_iter().map(Message::from));
    augmented
}
