use std::sync::Arc;

use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::llm::provider::{build_adapter, LLMAdapter};
use crate::types::{AppResult, LLMMessage, LLMRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes Roman Catholic church \
newsletters into warm, concise email messages";

const TEMPERATURE: f32 = 0.7;

pub fn build_prompt(text: &str) -> String {
    format!(
        "Summarize this church newsletter into a 2-paragraph email message: {}",
        text
    )
}

/// Turns extracted document text into an email-ready summary with a single backend call
#[derive(Clone)]
pub struct Summarizer {
    adapter: Arc<dyn LLMAdapter>,
    max_tokens: Option<u32>,
}

impl Summarizer {
    pub fn new(adapter: Arc<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Resolve the configured backend once. Fails on missing credentials.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let adapter: Arc<dyn LLMAdapter> = Arc::from(build_adapter(config)?);
        Ok(Self::new(adapter).with_max_tokens(config.max_tokens))
    }

    pub fn provider_name(&self) -> &str {
        self.adapter.name()
    }

    pub async fn summarize(&self, text: &str) -> AppResult<String> {
        let request = LLMRequest {
            messages: vec![LLMMessage::user(build_prompt(text))],
            max_tokens: self.max_tokens,
            temperature: Some(TEMPERATURE),
            system_instruction: Some(SYSTEM_PROMPT.to_string()),
        };

        debug!("Summarizing {} chars with {}", text.len(), self.adapter.name());
        let response = self.adapter.create_chat_completion(&request).await?;
        info!(
            "Summary generated by {} ({} tokens, finish: {})",
            self.adapter.name(),
            response.usage.total_tokens,
            response.finish_reason
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::StubAdapter;
    use crate::llm::ProviderKind;
    use crate::types::AppError;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("Bake sale on Sunday.");
        assert!(prompt.starts_with("Summarize this church newsletter"));
        assert!(prompt.ends_with("Bake sale on Sunday."));
    }

    #[tokio::test]
    async fn test_summary_returned_unmodified() {
        let stub = Arc::new(StubAdapter::replying("  Summary X\n"));
        let summarizer = Summarizer::new(stub.clone()).with_max_tokens(256);

        let summary = summarizer.summarize("newsletter body").await.unwrap();
        assert_eq!(summary, "  Summary X\n");

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.system_instruction.as_deref(), Some(SYSTEM_PROMPT));
        assert!(request.user_prompt().contains("newsletter body"));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let summarizer = Summarizer::new(Arc::new(StubAdapter::failing("provider down")));
        let err = summarizer.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
    }

    #[test]
    fn test_from_config_rejects_missing_key() {
        let config = LLMConfig {
            provider: ProviderKind::Anthropic,
            model: None,
            anthropic_api_key: String::new(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            ollama_url: "http://localhost:11434".to_string(),
            max_tokens: 1024,
            timeout_secs: 5,
            auto_route_threshold: 5000,
        };

        let err = Summarizer::from_config(&config).err().unwrap();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
