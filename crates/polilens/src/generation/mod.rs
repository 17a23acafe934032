//! Free-text generation: provider trait, Groq client, prompt templates

mod groq;
mod llm;
mod prompt;

pub use groq::GroqClient;
pub use llm::LlmProvider;
pub use prompt::PromptBuilder;
