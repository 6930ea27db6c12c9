// LLM abstraction layer

pub mod provider;
pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod openrouter;
pub mod routed;
pub mod summarizer;

pub use provider::*;
pub use summarizer::Summarizer;
