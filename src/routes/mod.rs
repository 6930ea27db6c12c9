//! API Routes
//!
//! - `GET /` - Welcome message
//! - `GET /health` - Liveness and configured backend
//! - `POST /upload-document` - Summarize an uploaded PDF or DOCX (requires `X-API-Key`)

pub mod health;
pub mod root;
pub mod upload;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(root::router())
        .merge(health::router(state.clone()))
        .merge(upload::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
