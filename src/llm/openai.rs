// OpenAI-compatible chat completions adapter
// Also used as the transport for OpenRouter, which speaks the same protocol.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
// gpt-4o family output ceiling
const MAX_OUTPUT_TOKENS: u32 = 16_384;

pub struct OpenAIAdapter {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    name: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Deserialize)]
struct ChatError {
    message: String,
}

impl OpenAIAdapter {
    pub fn new(client: Client, api_key: &str, model: Option<&str>) -> AppResult<Self> {
        Self::new_with_api_base(client, api_key, model, OPENAI_API_BASE, "openai", DEFAULT_MODEL)
    }

    pub fn new_with_api_base(
        client: Client,
        api_key: &str,
        model: Option<&str>,
        api_base: &str,
        name: &'static str,
        default_model: &str,
    ) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "API key for provider '{}' is not set",
                name
            )));
        }

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.unwrap_or(default_model).to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            name,
        })
    }
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    fn name(&self) -> &str {
        self.name
    }

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        let model = self.model.as_str();

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_instruction.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: &m.role,
            content: &m.content,
        }));

        let body = ChatRequest {
            model,
            messages,
            max_tokens: request.max_tokens.map(|t| t.min(MAX_OUTPUT_TOKENS)),
            temperature: request.temperature,
            stream: false,
        };

        debug!("Sending request to {} (model: {})", self.name, model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("{} request failed: {}", self.name, e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<ChatErrorResponse>(&error_text) {
                return Err(AppError::LLMApi(format!(
                    "{} API error ({}): {}",
                    self.name, status, error_response.error.message
                )));
            }

            return Err(AppError::LLMApi(format!(
                "{} API error ({}): {}",
                self.name, status, error_text
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::LLMApi(format!("Failed to parse {} response: {}", self.name, e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi(format!("{} returned no choices", self.name)))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| AppError::LLMApi(format!("{} returned an empty message", self.name)))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
        })
    }
}
