// SALLTO Herald API Gateway - document summarization over HTTP

pub mod config;
pub mod documents;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
