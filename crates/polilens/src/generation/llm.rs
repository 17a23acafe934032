//! LLM provider trait for free-text generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt-in, text-out generation.
///
/// One provider instance serves every call site (explanation, summary,
/// question answering, intent fallback); each site supplies its own prompt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate free text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model identifier in use.
    fn model(&self) -> &str;
}
