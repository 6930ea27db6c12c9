// Ollama adapter for locally served models (Mistral by default)
// API Reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MODEL: &str = "mistral";

pub struct OllamaAdapter {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaAdapter {
    pub fn new(client: Client, base_url: &str, model: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl LLMAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let model = self.model.as_str();
        let prompt = request.user_prompt();

        let body = GenerateRequest {
            model,
            prompt: &prompt,
            system: request.system_instruction.as_deref(),
            stream: false,
            options: Some(GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }),
        };

        debug!("Sending request to Ollama (model: {})", model);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Request to Ollama failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Ollama response: {}", e)))?;

        let prompt_tokens = parsed.prompt_eval_count.unwrap_or(0);
        let completion_tokens = parsed.eval_count.unwrap_or(0);

        Ok(LLMResponse {
            content: parsed.response,
            finish_reason: parsed.done_reason.unwrap_or_else(|| "stop".to_string()),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LLMMessage;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> LLMRequest {
        LLMRequest {
            messages: vec![LLMMessage::user("Summarize this newsletter")],
            max_tokens: None,
            temperature: Some(0.7),
            system_instruction: Some("Be warm".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_non_streaming() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "mistral",
                "prompt": "Summarize this newsletter",
                "system": "Be warm",
                "stream": false
            })))
            .with_status(200)
            .with_body(
                json!({
                    "model": "mistral",
                    "response": "A short summary.",
                    "done": true,
                    "done_reason": "stop",
                    "prompt_eval_count": 8,
                    "eval_count": 5
                })
                .to_string(),
            )
            .create_async()
            .await;

        let adapter = OllamaAdapter::new(Client::new(), &format!("{}/", server.url()), None);
        let response = adapter.create_chat_completion(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "A short summary.");
        assert_eq!(response.usage.total_tokens, 13);
    }

    #[tokio::test]
    async fn test_non_success_status_is_llm_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'mistral' not found"}"#)
            .create_async()
            .await;

        let adapter = OllamaAdapter::new(Client::new(), &server.url(), None);
        let err = adapter.create_chat_completion(&request()).await.unwrap_err();

        match err {
            AppError::LLMApi(message) => assert!(message.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_huge_usage_counts_saturate() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(
                json!({
                    "response": "ok",
                    "done": true,
                    "prompt_eval_count": u32::MAX,
                    "eval_count": 7
                })
                .to_string(),
            )
            .create_async()
            .await;

        let adapter = OllamaAdapter::new(Client::new(), &server.url(), None);
        let response = adapter.create_chat_completion(&request()).await.unwrap();

        assert_eq!(response.usage.total_tokens, u32::MAX);
    }
}
