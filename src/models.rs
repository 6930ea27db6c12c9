use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::documents::DocumentKind;
use crate::llm::Summarizer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Summarizer,
}

impl AppState {
    pub fn new(config: Config, summarizer: Summarizer) -> Self {
        Self {
            config: Arc::new(config),
            summarizer,
        }
    }
}

/// A file received on `/upload-document`, alive for the duration of one request
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: Option<String>,
    pub kind: DocumentKind,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub provider: String,
    pub version: String,
}
