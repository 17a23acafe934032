//! Policy-grounded question answering

use crate::error::Result;
use crate::generation::{LlmProvider, PromptBuilder};

/// Returned when a RAG question arrives before any analysis has loaded
/// policy chunks. Not an error: the user just needs directions.
pub const NO_CONTEXT_MESSAGE: &str = "I don't have any privacy policy context loaded yet.

Please analyze a privacy policy first by:
1. Going to the main page
2. Using \"Enter URL\" mode to analyze a website's privacy policy
3. Then come back and ask your questions!";

/// Answer a question against the loaded policy chunks.
///
/// With no chunks in context this returns the fixed guidance message
/// without touching the LLM; otherwise LLM failures propagate.
pub async fn handle_rag_query(
    question: &str,
    chunks: &[String],
    llm: &dyn LlmProvider,
) -> Result<String> {
    if chunks.is_empty() {
        return Ok(NO_CONTEXT_MESSAGE.to_string());
    }

    let context = chunks.join("\n\n---\n\n");
    let enhanced_question = format!(
        "Based on the privacy policy provided, {}\n\n\
         Please provide a clear, specific answer citing relevant parts of the policy.",
        question
    );

    llm.generate(&PromptBuilder::build_qa_prompt(&context, &enhanced_question))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;

    struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "echo"
        }
        fn model(&self) -> &str {
            "echo"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::llm("down"))
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
        fn name(&self) -> &str {
            "failing"
        }
        fn model(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn no_chunks_returns_guidance_without_llm() {
        // FailingLlm proves the provider is never called
        let answer = handle_rag_query("What data is collected?", &[], &FailingLlm)
            .await
            .unwrap();
        assert!(answer.contains("analyze a privacy policy first"));
        assert!(answer.contains("Enter URL"));
    }

    #[tokio::test]
    async fn chunks_are_joined_into_the_prompt() {
        let chunks = vec!["Chunk one.".to_string(), "Chunk two.".to_string()];
        let prompt = handle_rag_query("what is shared?", &chunks, &EchoLlm)
            .await
            .unwrap();
        assert!(prompt.contains("Chunk one.\n\n---\n\nChunk two."));
        assert!(prompt.contains("Based on the privacy policy provided, what is shared?"));
    }

    #[tokio::test]
    async fn llm_failure_propagates_with_chunks_present() {
        let chunks = vec!["Chunk.".to_string()];
        let result = handle_rag_query("q", &chunks, &FailingLlm).await;
        assert!(result.is_err());
    }
}
