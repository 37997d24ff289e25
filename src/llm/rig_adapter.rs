//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel};
use rig::message::Message;
use rust_decimal::Decimal;

use crate::error::LlmError;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Anthropic requires an explicit output budget.
const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Wraps any rig completion model.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        model_costs(&self.model_name)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut preamble = Vec::new();
        let mut history = Vec::new();
        for msg in request.messages {
            match msg.role {
                Role::System => preamble.push(msg.content),
                Role::User => history.push(Message::user(msg.content)),
                Role::Assistant => history.push(Message::assistant(msg.content)),
            }
        }

        let prompt = history.pop().ok_or_else(|| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: "completion request has no user message".to_string(),
        })?;

        let mut builder = self
            .model
            .completion_request(prompt)
            .messages(history)
            .max_tokens(request.max_tokens.map(u64::from).unwrap_or(DEFAULT_MAX_TOKENS));
        if !preamble.is_empty() {
            builder = builder.preamble(preamble.join("\n\n"));
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "response contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens as u32,
            output_tokens: response.usage.output_tokens as u32,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

/// Published per-token prices for the models we expect to run.
fn model_costs(model: &str) -> (Decimal, Decimal) {
    // USD per million tokens.
    let (input, output) = if model.contains("opus") {
        (15, 75)
    } else if model.contains("sonnet") {
        (3, 15)
    } else if model.contains("haiku") {
        (1, 5)
    } else if model.starts_with("gpt-4o-mini") {
        return (Decimal::new(15, 8), Decimal::new(60, 8));
    } else if model.starts_with("gpt-4o") {
        return (Decimal::new(25, 7), Decimal::new(10, 6));
    } else {
        (0, 0)
    };
    (Decimal::new(input, 6), Decimal::new(output, 6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sonnet_costs() {
        let (input, output) = model_costs("claude-sonnet-4-20250514");
        assert_eq!(input, Decimal::new(3, 6));
        assert_eq!(output, Decimal::new(15, 6));
    }

    #[test]
    fn unknown_model_is_free() {
        assert_eq!(model_costs("local-llama"), (Decimal::ZERO, Decimal::ZERO));
    }
}
