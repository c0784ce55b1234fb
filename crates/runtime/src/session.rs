//! Session management.

use crate::model::{Backend, Message};
use crate::orchestrator::{Answer, Orchestrator, ToolPolicy};
use crate::tools::ToolInvoker;

/// Ordered, append-only conversation history.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A conversation driven by an orchestrator.
///
/// Only user turns and final answer texts enter the history; tool-call
/// messages live for one turn.
pub struct Session<B, T> {
    conversation: Conversation,
    orchestrator: Orchestrator<B, T>,
}

impl<B: Backend, T: ToolInvoker> Session<B, T> {
    pub fn new(orchestrator: Orchestrator<B, T>) -> Self {
        Self {
            conversation: Conversation::new(),
            orchestrator,
        }
    }

    /// Send a user message and get the answer for it.
    pub async fn chat(&mut self, input: &str, policy: ToolPolicy) -> Answer {
        self.conversation.append_user(input);

        let answer = self
            .orchestrator
            .respond(self.conversation.history(), policy)
            .await;

        self.conversation.append_assistant(answer.text());
        answer
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn orchestrator(&self) -> &Orchestrator<B, T> {
        &self.orchestrator
    }
}
