//! Prompt templates for explanation, summarization, QA, and intent fallback

use std::collections::HashMap;

use crate::taxonomy;

/// Evidence snippets are truncated to this many characters in the
/// explanation context map.
const EVIDENCE_SNIPPET_CHARS: usize = 400;

/// Prompt builder for all generation call sites
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the label → risk → evidence context map fed to the
    /// explanation prompt. Evidence is flattened to one line and truncated.
    pub fn build_explanation_context(
        labels: &[String],
        relevant_chunks: &HashMap<String, String>,
    ) -> String {
        labels
            .iter()
            .map(|label| {
                let snippet = relevant_chunks
                    .get(label)
                    .map(String::as_str)
                    .unwrap_or("No specific text found.");
                let snippet: String = snippet
                    .chars()
                    .take(EVIDENCE_SNIPPET_CHARS)
                    .map(|c| if c == '\n' { ' ' } else { c })
                    .collect();
                let risk = taxonomy::risk_tier_for_label(label);
                format!("- **{}** (Risk: {}): \"{}...\"", label, risk, snippet)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Explanation prompt over the detected-label context map.
    pub fn build_explanation_prompt(context_map: &str) -> String {
        format!(
            r#"You are a privacy policy analysis expert.

The following labels were detected in a company's privacy policy, based on the extracted text provided:

{context_map}

Instructions:
1. For each label detected, explain the *implication* of the specific text snippet provided.
2. Contextualize why this falls under the stated Risk Level (Low/Medium/High).
3. Keep the explanation concise, factual, and user-friendly. No long paragraphs."#,
        )
    }

    /// Summarization prompt over (truncated) policy text.
    pub fn build_summary_prompt(policy_text: &str) -> String {
        format!(
            r#"You are a legal-tech assistant specializing in privacy policy analysis.

Below is the text extracted from a privacy policy. Please provide a high-quality summary.

TEXT:
{policy_text}

Instructions:
1. **Metadata**: Start by identifying the Company Name and their Location/Jurisdiction if mentioned.
2. **Overview**: Provide a concise summary of the policy's purpose.
3. **Key Highlights**: Summarize the core practices regarding:
   - Data collection & usage
   - Third-party sharing
   - User rights & control
   - Retention & security
4. Use a professional yet accessible tone. Avoid generic filler."#,
        )
    }

    /// Question-answering prompt, strictly grounded in the given context.
    pub fn build_qa_prompt(context: &str, question: &str) -> String {
        format!(
            r#"You are a privacy policy assistant.

Context:
{context}

User Question:
{question}

Answer clearly and accurately, strictly using the context."#,
        )
    }

    /// Intent-classification prompt for the generative fallback. The model
    /// is asked for exactly one category token; the router normalizes the
    /// reply with loose matching regardless.
    pub fn build_intent_prompt(message: &str) -> String {
        format!(
            r#"Classify the user's intent into ONE of the following categories:

- RAG_QUESTION: Questions about privacy policy, data collection, user rights, terms of service, cookies, tracking, third parties, security, retention, or any privacy-related topic
- INSTRUCTION: Questions about how to use this tool, what this project does, or technical help
- OFF_TOPIC: Unrelated topics like weather, jokes, poems, general knowledge

User message: {message}

Think carefully: If the question could be about privacy policies or data practices, classify it as RAG_QUESTION.

Respond with ONLY ONE of these exact words: RAG_QUESTION, INSTRUCTION, or OFF_TOPIC"#,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explanation_context_includes_label_risk_and_snippet() {
        let labels = vec!["Data Retention".to_string()];
        let mut chunks = HashMap::new();
        chunks.insert(
            "Data Retention".to_string(),
            "We keep your data\nfor five years.".to_string(),
        );
        let context = PromptBuilder::build_explanation_context(&labels, &chunks);
        assert!(context.contains("**Data Retention**"));
        assert!(context.contains("(Risk: high)"));
        // Newlines in evidence are flattened
        assert!(context.contains("We keep your data for five years."));
    }

    #[test]
    fn explanation_context_truncates_long_evidence() {
        let labels = vec!["Data Security".to_string()];
        let mut chunks = HashMap::new();
        chunks.insert("Data Security".to_string(), "x".repeat(1000));
        let context = PromptBuilder::build_explanation_context(&labels, &chunks);
        // 400 chars of evidence plus formatting, nowhere near 1000
        assert!(context.len() < 500);
    }

    #[test]
    fn missing_evidence_gets_placeholder() {
        let labels = vec!["Policy Change".to_string()];
        let context = PromptBuilder::build_explanation_context(&labels, &HashMap::new());
        assert!(context.contains("No specific text found."));
    }

    #[test]
    fn qa_prompt_embeds_context_and_question() {
        let prompt = PromptBuilder::build_qa_prompt("CTX", "What is collected?");
        assert!(prompt.contains("CTX"));
        assert!(prompt.contains("What is collected?"));
        assert!(prompt.contains("strictly using the context"));
    }

    #[test]
    fn intent_prompt_lists_all_three_categories() {
        let prompt = PromptBuilder::build_intent_prompt("hello");
        assert!(prompt.contains("RAG_QUESTION"));
        assert!(prompt.contains("INSTRUCTION"));
        assert!(prompt.contains("OFF_TOPIC"));
        assert!(prompt.contains("hello"));
    }
}
