//! Analysis endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnalysisResponse, AnalyzeTextRequest, AnalyzeUrlRequest};

/// Pasted text shorter than this is rejected before the pipeline runs.
const MIN_TEXT_CHARS: usize = 20;

/// POST /api/analyze-url - Scrape and analyze the policy behind a URL
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> Result<Json<AnalysisResponse>> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(Error::InvalidRequest("url must not be empty".to_string()));
    }

    let start = Instant::now();
    let response = state
        .pipeline()
        .analyze_url(url, request.model.as_deref())
        .await?;

    tracing::info!(
        url,
        detected = response.labels.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "URL analysis complete"
    );
    Ok(Json(response))
}

/// POST /api/analyze-text - Analyze pasted policy text
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisResponse>> {
    let text = request.text.trim();
    if text.len() < MIN_TEXT_CHARS {
        return Err(Error::InvalidRequest(format!(
            "text must be at least {} characters",
            MIN_TEXT_CHARS
        )));
    }

    let start = Instant::now();
    let response = state
        .pipeline()
        .analyze_text(text, request.model.as_deref())
        .await?;

    tracing::info!(
        chars = text.len(),
        detected = response.labels.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "text analysis complete"
    );
    Ok(Json(response))
}
