// API key authentication for the upload endpoint

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::models::AppState;
use crate::types::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare a presented credential against the expected secret.
///
/// Runs in time proportional to the longer input regardless of where the
/// first mismatch is. An empty expected secret never matches.
pub fn verify_api_key(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    constant_time_compare(expected.as_bytes(), presented.as_bytes())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let max_len = std::cmp::max(a.len(), b.len());
    let mut diff = (a.len() != b.len()) as u8;
    for i in 0..max_len {
        let byte_a = a.get(i).copied().unwrap_or(0);
        let byte_b = b.get(i).copied().unwrap_or(0);
        diff |= byte_a ^ byte_b;
    }
    diff == 0
}

/// Credential from `X-API-Key`, falling back to `Authorization: Bearer <key>`.
pub fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.trim());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = presented_key(req.headers())
        .map(|key| verify_api_key(&state.config.auth.api_key, key))
        .unwrap_or(false);

    if !authorized {
        warn!("Rejected request to {}: invalid or missing API key", req.uri().path());
        return AppError::Auth("invalid or missing API key".to_string()).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_verify_api_key() {
        assert!(verify_api_key("super-secret-key", "super-secret-key"));
        assert!(!verify_api_key("super-secret-key", "super-secret-kez"));
        assert!(!verify_api_key("super-secret-key", "super-secret-key!"));
        assert!(!verify_api_key("super-secret-key", "super"));
        assert!(!verify_api_key("super-secret-key", ""));
        assert!(!verify_api_key("", ""));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hello!"));
        assert!(!constant_time_compare(b"", b"a"));
        assert!(constant_time_compare(b"", b""));
        // Lengths differing by a multiple of 256 must still mismatch
        assert!(!constant_time_compare(&[0u8; 256], b""));
    }

    #[test]
    fn test_presented_key_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(presented_key(&headers), Some("from-bearer"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(presented_key(&headers), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(presented_key(&headers), None);
    }
}
