//! Inbound request types

use serde::{Deserialize, Serialize};

/// Analyze the policy behind a URL.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeUrlRequest {
    pub url: String,
    /// Model key; unknown or missing keys resolve to the default
    #[serde(default)]
    pub model: Option<String>,
}

/// Analyze pasted policy text.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// A chat message, optionally carrying chunks from a prior analysis as
/// question-answering context.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default)]
    pub chunks: Vec<String>,
}

/// Unified pipeline entry request. Exactly one input field decides the
/// path: a document source routes to analysis, a user message routes to
/// chat, neither is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Document source: URL to scrape
    #[serde(default)]
    pub url: Option<String>,
    /// Document source: pasted policy text
    #[serde(default)]
    pub text: Option<String>,
    /// Chat input
    #[serde(default)]
    pub user_message: Option<String>,
    /// Prior-analysis chunks supplied as chat context
    #[serde(default)]
    pub chunks: Vec<String>,
    /// Classifier model key
    #[serde(default)]
    pub model: Option<String>,
}

impl PipelineRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn for_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn for_chat(message: impl Into<String>, chunks: Vec<String>) -> Self {
        Self {
            user_message: Some(message.into()),
            chunks,
            ..Default::default()
        }
    }
}
