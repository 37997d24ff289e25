//! Free-form HR assistant chat.

use std::sync::Arc;

use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::CHAT_SYSTEM_PROMPT;

/// Phrases that end a chat session.
pub const STOP_COMMANDS: [&str; 4] = ["stop", "exit", "quit", "silence"];

pub const FAREWELL: &str = "Okay, stopping the onboarding flow. Bye!";

/// A single chat turn's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The user asked to stop; the session should end.
    Farewell,
    Message(String),
}

impl ChatReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Farewell => FAREWELL,
            Self::Message(text) => text,
        }
    }

    pub fn is_farewell(&self) -> bool {
        matches!(self, Self::Farewell)
    }
}

pub fn is_stop_command(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    STOP_COMMANDS.contains(&normalized.as_str())
}

/// Answers HR questions through the LLM. Each turn is independent.
pub struct ChatAssistant {
    llm: Arc<dyn LlmProvider>,
}

impl ChatAssistant {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn respond(&self, text: &str) -> Result<ChatReply, LlmError> {
        if is_stop_command(text) {
            return Ok(ChatReply::Farewell);
        }

        let request = CompletionRequest::new(vec![
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ])
        .with_temperature(0.4);

        let response = self.llm.complete(request).await?;
        debug!(output_tokens = response.output_tokens, "Chat reply generated");
        Ok(ChatReply::Message(response.content.trim().to_string()))
    }
}
