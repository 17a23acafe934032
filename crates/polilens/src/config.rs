//! Configuration for the analysis service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolilensConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Scraper configuration
    #[serde(default)]
    pub scraper: ScraperConfig,
    /// Text chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

impl PolilensConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Minimum character count for an extracted paragraph
    pub min_paragraph_chars: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            min_paragraph_chars: 30,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between neighboring chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size after post-processing (smaller chunks are dropped)
    pub min_chunk_chars: usize,
    /// Paragraphs at or below this length are treated as scraping noise
    pub paragraph_floor_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
            min_chunk_chars: 50,
            paragraph_floor_chars: 20,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Default model key (see [`crate::classify::AVAILABLE_MODELS`])
    pub default_model: String,
    /// Maximum sequence length for tokenization
    pub max_length: usize,
    /// Cache directory for downloaded model/tokenizer files
    pub cache_dir: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_model: "deberta-v2".to_string(),
            max_length: 512,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("polilens")
                .join("models"),
        }
    }
}

/// LLM (Groq chat-completions) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL (OpenAI-compatible)
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retries for transient failures
    pub max_retries: u32,
    /// API key; falls back to the GROQ_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: 60,
            max_retries: 2,
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var("GROQ_API_KEY")
            .map_err(|_| Error::Config("GROQ_API_KEY not set and llm.api_key missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = PolilensConfig::default();
        assert_eq!(config.chunking.chunk_size, 1500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.chunking.min_chunk_chars, 50);
        assert_eq!(config.chunking.paragraph_floor_chars, 20);
        assert_eq!(config.classifier.default_model, "deberta-v2");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: PolilensConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            enable_cors = false

            [chunking]
            chunk_size = 800
            chunk_overlap = 100
            min_chunk_chars = 40
            paragraph_floor_chars = 10
            "#,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.chunking.chunk_size, 800);
        // Untouched sections keep defaults
        assert_eq!(parsed.classifier.default_model, "deberta-v2");
        assert_eq!(parsed.llm.max_tokens, 1024);
    }
}
