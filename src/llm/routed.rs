//! Size-based routing between two backends.
//!
//! Short prompts go to the inexpensive backend (local Mistral), prompts whose
//! estimated token count exceeds the threshold go to the long-context one
//! (Claude). Token counts use the cl100k encoding and run on the blocking pool.

use std::sync::Arc;

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use tiktoken_rs::CoreBPE;
use tracing::info;

pub struct RoutedAdapter {
    short: Box<dyn LLMAdapter>,
    long: Box<dyn LLMAdapter>,
    threshold: usize,
    bpe: Arc<CoreBPE>,
}

impl RoutedAdapter {
    pub fn new(
        short: Box<dyn LLMAdapter>,
        long: Box<dyn LLMAdapter>,
        threshold: usize,
    ) -> AppResult<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| AppError::Configuration(format!("failed to load tokenizer: {}", e)))?;

        Ok(Self {
            short,
            long,
            threshold,
            bpe: Arc::new(bpe),
        })
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Same count as [`Self::count_tokens`], off the async worker threads.
    pub async fn estimate_tokens(&self, text: String) -> AppResult<usize> {
        let bpe = Arc::clone(&self.bpe);
        tokio::task::spawn_blocking(move || bpe.encode_with_special_tokens(&text).len())
            .await
            .map_err(|e| AppError::LLMApi(format!("token estimate task failed: {}", e)))
    }

    async fn select(&self, request: &LLMRequest) -> AppResult<(&dyn LLMAdapter, usize)> {
        let tokens = self.estimate_tokens(request.user_prompt()).await?;
        if tokens > self.threshold {
            Ok((self.long.as_ref(), tokens))
        } else {
            Ok((self.short.as_ref(), tokens))
        }
    }
}

#[async_trait]
impl LLMAdapter for RoutedAdapter {
    fn name(&self) -> &str {
        "auto"
    }

    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let (adapter, tokens) = self.select(request).await?;
        info!(
            "Estimated tokens: {}, routing to {} (threshold {})",
            tokens,
            adapter.name(),
            self.threshold
        );
        adapter.create_chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::StubAdapter;
    use crate::types::LLMMessage;

    fn request(prompt: &str) -> LLMRequest {
        LLMRequest {
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
            system_instruction: None,
        }
    }

    fn routed(threshold: usize) -> (RoutedAdapter, Arc<StubAdapter>, Arc<StubAdapter>) {
        let short = Arc::new(StubAdapter::replying("short"));
        let long = Arc::new(StubAdapter::replying("long"));
        let adapter = RoutedAdapter::new(
            Box::new(short.clone()),
            Box::new(long.clone()),
            threshold,
        )
        .unwrap();
        (adapter, short, long)
    }

    #[tokio::test]
    async fn test_short_prompt_uses_short_backend() {
        let (adapter, short, long) = routed(50);
        let response = adapter
            .create_chat_completion(&request("Mass times change next week."))
            .await
            .unwrap();

        assert_eq!(response.content, "short");
        assert_eq!(short.call_count(), 1);
        assert_eq!(long.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_prompt_uses_long_backend() {
        let (adapter, short, long) = routed(50);
        let prompt = "The parish picnic will be held after the 10am Mass. ".repeat(40);
        let response = adapter.create_chat_completion(&request(&prompt)).await.unwrap();

        assert_eq!(response.content, "long");
        assert_eq!(short.call_count(), 0);
        assert_eq!(long.call_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_estimate_matches_count_on_single_threaded_runtime() {
        let (adapter, short, long) = routed(50);
        let prompt = "Choir rehearsal moves to Thursday. ".repeat(200);

        let estimate = adapter.estimate_tokens(prompt.clone()).await.unwrap();
        assert_eq!(estimate, adapter.count_tokens(&prompt));

        let response = adapter.create_chat_completion(&request(&prompt)).await.unwrap();
        assert_eq!(response.content, "long");
        assert_eq!(short.call_count(), 0);
        assert_eq!(long.call_count(), 1);
    }

    #[test]
    fn test_count_tokens() {
        let (adapter, _, _) = routed(10);
        assert_eq!(adapter.count_tokens(""), 0);
        assert!(adapter.count_tokens("hello world") >= 2);
    }
}
