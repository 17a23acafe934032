//! Two-tier intent routing for chat messages.
//!
//! A deterministic keyword scan handles the common cases for free; only
//! ambiguous messages pay for a generative classification, and any failure
//! there degrades to RAG_QUESTION so the conversation keeps moving.

use serde::{Deserialize, Serialize};

use crate::generation::{LlmProvider, PromptBuilder};

/// Conversational intent of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// A question answerable from the loaded policy text
    #[serde(rename = "RAG_QUESTION")]
    RagQuestion,
    /// A question about the tool itself
    #[serde(rename = "INSTRUCTION")]
    Instruction,
    /// Anything else
    #[serde(rename = "OFF_TOPIC")]
    OffTopic,
}

/// Privacy/data-practice terms that mark an answerable question.
const RAG_KEYWORDS: [&str; 25] = [
    "data",
    "privacy",
    "collect",
    "share",
    "policy",
    "information",
    "personal",
    "cookie",
    "track",
    "third party",
    "retention",
    "security",
    "rights",
    "delete",
    "access",
    "consent",
    "gdpr",
    "ccpa",
    "what does",
    "how does",
    "why does",
    "can they",
    "do they",
    "is my",
    "are my",
];

/// "How do I use this tool" phrasings.
const INSTRUCTION_KEYWORDS: [&str; 4] = [
    "how to use",
    "what is this",
    "what does this tool",
    "help me",
];

/// Deterministic keyword tier. RAG keywords take precedence when a message
/// matches both sets.
pub fn keyword_intent(message: &str) -> Option<Intent> {
    let lower = message.to_lowercase();
    if RAG_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Intent::RagQuestion);
    }
    if INSTRUCTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Intent::Instruction);
    }
    None
}

/// Normalize a free-text classifier reply by loose substring matching.
/// Unrecognized replies default to RAG_QUESTION: attempting an answer beats
/// refusing one.
pub fn normalize_intent(raw: &str) -> Intent {
    let upper = raw.trim().to_uppercase();
    if upper.contains("RAG") || upper.contains("QUESTION") {
        Intent::RagQuestion
    } else if upper.contains("INSTRUCTION") {
        Intent::Instruction
    } else if upper.contains("OFF") || upper.contains("TOPIC") {
        Intent::OffTopic
    } else {
        Intent::RagQuestion
    }
}

/// Detect intent: keyword tier first, generative fallback for the rest.
/// A fallback failure is caught here, never propagated.
pub async fn detect_intent(message: &str, llm: &dyn LlmProvider) -> Intent {
    if let Some(intent) = keyword_intent(message) {
        return intent;
    }

    match llm.generate(&PromptBuilder::build_intent_prompt(message)).await {
        Ok(reply) => normalize_intent(&reply),
        Err(e) => {
            tracing::warn!(error = %e, "intent fallback failed, defaulting to RAG_QUESTION");
            Intent::RagQuestion
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;

    /// Deterministic stand-in for the generative fallback.
    struct StubLlm {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(Error::llm("provider down")),
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(self.reply.is_some())
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn privacy_terms_hit_rag_keywords() {
        assert_eq!(
            keyword_intent("What data do they collect about me?"),
            Some(Intent::RagQuestion)
        );
    }

    #[test]
    fn tool_questions_hit_instruction_keywords() {
        assert_eq!(keyword_intent("What is this tool?"), Some(Intent::Instruction));
    }

    #[test]
    fn rag_keywords_win_over_instruction_keywords() {
        // "what is this" (instruction) and "policy" (RAG) both match
        assert_eq!(
            keyword_intent("what is this privacy policy about"),
            Some(Intent::RagQuestion)
        );
    }

    #[test]
    fn no_keywords_yields_none() {
        assert_eq!(keyword_intent("Tell me a joke"), None);
    }

    #[test]
    fn normalization_is_loose() {
        assert_eq!(normalize_intent("RAG_QUESTION"), Intent::RagQuestion);
        assert_eq!(normalize_intent("This is a question."), Intent::RagQuestion);
        assert_eq!(normalize_intent("instruction"), Intent::Instruction);
        assert_eq!(normalize_intent("OFF_TOPIC"), Intent::OffTopic);
        assert_eq!(normalize_intent("off topic, sorry"), Intent::OffTopic);
        assert_eq!(normalize_intent("no idea"), Intent::RagQuestion);
    }

    #[tokio::test]
    async fn keyword_tier_skips_the_fallback() {
        // Provider errors, but the keyword tier already decided
        let llm = StubLlm { reply: None };
        let intent = detect_intent("What data do they collect about me?", &llm).await;
        assert_eq!(intent, Intent::RagQuestion);
    }

    #[tokio::test]
    async fn fallback_classifies_ambiguous_messages() {
        let llm = StubLlm {
            reply: Some("OFF_TOPIC"),
        };
        assert_eq!(detect_intent("Tell me a joke", &llm).await, Intent::OffTopic);
    }

    #[tokio::test]
    async fn fallback_failure_defaults_to_rag() {
        let llm = StubLlm { reply: None };
        assert_eq!(detect_intent("Tell me a joke", &llm).await, Intent::RagQuestion);
    }
}
