use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use reqwest::Client;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

pub struct OpenRouterAdapter {
    inner: crate::llm::openai::OpenAIAdapter,
}

impl OpenRouterAdapter {
    pub fn new(client: Client, api_key: &str, model: Option<&str>) -> AppResult<Self> {
        Ok(Self {
            inner: crate::llm::openai::OpenAIAdapter::new_with_api_base(
                client,
                api_key,
                model,
                OPENROUTER_API_BASE,
                "openrouter",
                DEFAULT_MODEL,
            )?,
        })
    }
}

#[async_trait]
impl LLMAdapter for OpenRouterAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.inner.create_chat_completion(request).await
    }
}
