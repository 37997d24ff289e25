//! Welcome message drafting through the LLM provider.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider, estimate_cost};

use super::model::Employee;
use super::prompts;

/// Personalization fields handed to the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeFields {
    pub name: String,
    pub role: String,
    pub team: String,
    pub start_date: NaiveDate,
    /// The employee's manager, or the configured fallback contact.
    pub manager_email: String,
    pub location: String,
}

impl WelcomeFields {
    pub fn for_employee(employee: &Employee, fallback_manager: &str) -> Self {
        Self {
            name: employee.name.clone(),
            role: employee.role.clone(),
            team: employee.department.clone(),
            start_date: employee.joined_on,
            manager_email: employee
                .manager_email
                .clone()
                .unwrap_or_else(|| fallback_manager.to_string()),
            location: employee.location.clone(),
        }
    }
}

/// Produces the welcome message body.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn draft(&self, fields: &WelcomeFields) -> Result<String, LlmError>;
}

/// Settings for LLM-backed drafting.
#[derive(Debug, Clone)]
pub struct DrafterConfig {
    pub company: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for DrafterConfig {
    fn default() -> Self {
        Self {
            company: "VachhaniAI Labs".to_string(),
            temperature: 0.4,
            max_tokens: 2048,
        }
    }
}

/// Drafts HTML welcome emails with an `LlmProvider`.
pub struct LlmTextGenerator {
    llm: Arc<dyn LlmProvider>,
    config: DrafterConfig,
}

impl LlmTextGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: DrafterConfig) -> Self {
        Self { llm, config }
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn draft(&self, fields: &WelcomeFields) -> Result<String, LlmError> {
        info!(name = %fields.name, model = self.llm.model_name(), "Drafting welcome email");

        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::WELCOME_SYSTEM_PROMPT),
            ChatMessage::user(prompts::welcome_email_prompt(fields, &self.config.company)),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = self.llm.complete(request).await?;
        debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost = %estimate_cost(self.llm.as_ref(), &response),
            "Welcome email drafted"
        );

        if response.content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty completion".to_string(),
            });
        }
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rust_decimal::Decimal;

    use crate::llm::provider::{CompletionResponse, FinishReason, Role};
    use crate::onboarding::model::Level;
    use crate::onboarding::model::fixtures::{date, employee};

    struct StubLlm {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl StubLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok(CompletionResponse {
                content: self.reply.clone(),
                input_tokens: 10,
                output_tokens: 20,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[test]
    fn missing_manager_uses_fallback() {
        let mut e = employee(1, "Data Engineer", Level::Junior, date(2026, 10, 16), "Pune");
        e.manager_email = None;
        let fields = WelcomeFields::for_employee(&e, "hr@company.com");
        assert_eq!(fields.manager_email, "hr@company.com");
        assert_eq!(fields.team, "Data Platform");

        let e = employee(2, "Data Engineer", Level::Junior, date(2026, 10, 16), "Pune");
        let fields = WelcomeFields::for_employee(&e, "hr@company.com");
        assert_eq!(fields.manager_email, "lead.de@example.com");
    }

    #[tokio::test]
    async fn draft_sends_system_and_user_prompts() {
        let llm = Arc::new(StubLlm::new("<p>Welcome!</p>"));
        let generator = LlmTextGenerator::new(llm.clone(), DrafterConfig::default());
        let e = employee(1, "Data Engineer", Level::Junior, date(2026, 10, 16), "Pune");

        let body = generator
            .draft(&WelcomeFields::for_employee(&e, "hr@company.com"))
            .await
            .unwrap();
        assert_eq!(body, "<p>Welcome!</p>");

        let seen = llm.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.temperature, Some(0.4));
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[1].content.contains("Employee 1"));
    }

    #[tokio::test]
    async fn empty_completion_is_invalid_response() {
        let generator =
            LlmTextGenerator::new(Arc::new(StubLlm::new("   ")), DrafterConfig::default());
        let e = employee(1, "Data Engineer", Level::Junior, date(2026, 10, 16), "Pune");
        let err = generator
            .draft(&WelcomeFields::for_employee(&e, "hr@company.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }
}
