use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

use crate::llm::ProviderKind;

pub const DEFAULT_APP_NAME: &str = "SALLTO Herald API Gateway";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub debug: bool,
    pub log_file: Option<String>,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub api_key: String,
}

// Keep the secret out of `Debug` output, which is logged at startup.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").field("api_key", &"<redacted>").finish()
    }
}

#[derive(Clone)]
pub struct LLMConfig {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub openrouter_api_key: String,
    pub ollama_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub auto_route_threshold: usize,
}

impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(key: &str) -> &'static str {
            if key.is_empty() {
                "<unset>"
            } else {
                "<set>"
            }
        }

        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("openrouter_api_key", &mask(&self.openrouter_api_key))
            .field("ollama_url", &self.ollama_url)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("auto_route_threshold", &self.auto_route_threshold)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_key = lookup("API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("API_KEY must be set"))?;

        Ok(Self {
            app_name: var("APP_NAME", DEFAULT_APP_NAME),
            debug: parse_var(&lookup, "DEBUG", false)?,
            log_file: lookup("LOG_FILE").filter(|p| !p.is_empty()),
            server: ServerConfig {
                port: parse_var(&lookup, "API_PORT", 8000)?,
                host: var("API_HOST", "0.0.0.0"),
                cors_allowed_origins: var(
                    "CORS_ORIGINS",
                    "http://localhost:3000,http://127.0.0.1:3000",
                )
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
                max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            },
            auth: AuthConfig { api_key },
            llm: LLMConfig {
                provider: parse_var(&lookup, "LLM_PROVIDER", ProviderKind::Auto)?,
                model: lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()),
                anthropic_api_key: var("ANTHROPIC_API_KEY", ""),
                openai_api_key: var("OPENAI_API_KEY", ""),
                openrouter_api_key: var("OPENROUTER_API_KEY", ""),
                ollama_url: var("OLLAMA_URL", "http://localhost:11434"),
                max_tokens: parse_var(&lookup, "MAX_ALLOWED_TOKENS", 20_000)?,
                timeout_secs: parse_var(&lookup, "LLM_TIMEOUT_SECS", 30)?,
                auto_route_threshold: parse_var(&lookup, "AUTO_ROUTE_THRESHOLD", 5000)?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
