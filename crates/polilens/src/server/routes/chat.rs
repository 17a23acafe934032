//! Chat endpoint

use axum::{extract::State, Json};

use crate::chatbot::ChatResponse;
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::ChatMessageRequest;

/// POST /api/chat - Answer a chat message, optionally against prior chunks
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatResponse>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(Error::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    let response = state.pipeline().chat(message, &request.chunks).await?;
    Ok(Json(response))
}
