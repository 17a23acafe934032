//! API routes for the analysis server

pub mod analyze;
pub mod chat;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::classify::AVAILABLE_MODELS;
use crate::server::state::AppState;
use crate::types::ModelsResponse;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models))
        .route("/analyze-url", post(analyze::analyze_url))
        .route("/analyze-text", post(analyze::analyze_text))
        .route("/chat", post(chat::chat))
}

/// GET /api/models - Registered classifier models
async fn list_models(state: axum::extract::State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: AVAILABLE_MODELS.iter().map(|(k, _)| k.to_string()).collect(),
        default: state.config().classifier.default_model.clone(),
    })
}
