use axum::{routing::get, Json, Router};

use crate::models::WelcomeResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to your SALLTO Herald API Gateway";

pub fn router() -> Router {
    Router::new().route("/", get(root))
}

async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}
