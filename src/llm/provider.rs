use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    /// Short backend name used in logs and the health endpoint
    fn name(&self) -> &str;

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

#[async_trait]
impl<T: LLMAdapter + ?Sized> LLMAdapter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        (**self).create_chat_completion(request).await
    }
}

/// The closed set of summarization backends selectable through `LLM_PROVIDER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    Ollama,
    OpenAI,
    OpenRouter,
    /// Ollama for short prompts, Anthropic above the token threshold
    Auto,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::OpenRouter => write!(f, "openrouter"),
            ProviderKind::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown LLM provider {0:?} (expected anthropic, ollama, openai, openrouter or auto)")]
pub struct UnknownProvider(String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" | "mistral" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAI),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "auto" => Ok(ProviderKind::Auto),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Shared HTTP client for outbound provider calls. One attempt, bounded by `timeout_secs`.
pub fn http_client(timeout_secs: u64) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Resolve the configured backend into a concrete adapter.
///
/// Missing credentials are reported here, before any request is sent.
pub fn build_adapter(config: &LLMConfig) -> AppResult<Box<dyn LLMAdapter>> {
    let client = http_client(config.timeout_secs)?;
    let model = config.model.as_deref();

    let adapter: Box<dyn LLMAdapter> = match config.provider {
        ProviderKind::Anthropic => Box::new(crate::llm::anthropic::AnthropicAdapter::new(
            client,
            &config.anthropic_api_key,
            model,
        )?),
        ProviderKind::Ollama => Box::new(crate::llm::ollama::OllamaAdapter::new(
            client,
            &config.ollama_url,
            model,
        )),
        ProviderKind::OpenAI => Box::new(crate::llm::openai::OpenAIAdapter::new(
            client,
            &config.openai_api_key,
            model,
        )?),
        ProviderKind::OpenRouter => Box::new(crate::llm::openrouter::OpenRouterAdapter::new(
            client,
            &config.openrouter_api_key,
            model,
        )?),
        ProviderKind::Auto => {
            let short = crate::llm::ollama::OllamaAdapter::new(client.clone(), &config.ollama_url, None);
            let long =
                crate::llm::anthropic::AnthropicAdapter::new(client, &config.anthropic_api_key, None)?;
            Box::new(crate::llm::routed::RoutedAdapter::new(
                Box::new(short),
                Box::new(long),
                config.auto_route_threshold,
            )?)
        }
    };

    info!("LLM backend resolved: {} ({})", config.provider, adapter.name());
    Ok(adapter)
}
