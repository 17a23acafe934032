//! Chat response envelope.
//!
//! Every chat handler's output is normalized into this one shape before it
//! leaves the pipeline, regardless of which branch produced it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which handler produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    #[serde(rename = "RAG")]
    Rag,
    #[serde(rename = "INSTRUCTION")]
    Instruction,
    #[serde(rename = "GUARDRAIL")]
    Guardrail,
}

/// The chat response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Source markers; `["Policy Text"]` for RAG answers, empty otherwise
    pub sources: Vec<String>,
    /// Risk detail slot; stays empty at this layer (risk belongs to the
    /// analysis envelope)
    pub risks: Map<String, Value>,
}

/// Assemble the final envelope. Sources are populated only for the RAG
/// branch, as a literal marker rather than content citations.
pub fn build_response(answer: String, response_type: ResponseType) -> ChatResponse {
    let sources = if response_type == ResponseType::Rag {
        vec!["Policy Text".to_string()]
    } else {
        Vec::new()
    };

    ChatResponse {
        answer,
        response_type,
        sources,
        risks: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rag_responses_carry_the_policy_text_marker() {
        let response = build_response("answer".to_string(), ResponseType::Rag);
        assert_eq!(response.sources, vec!["Policy Text"]);
        assert!(response.risks.is_empty());
    }

    #[test]
    fn non_rag_responses_have_no_sources() {
        let response = build_response("answer".to_string(), ResponseType::Instruction);
        assert!(response.sources.is_empty());
        let response = build_response("answer".to_string(), ResponseType::Guardrail);
        assert!(response.sources.is_empty());
    }

    #[test]
    fn envelope_serializes_with_type_tag() {
        let response = build_response("hi".to_string(), ResponseType::Rag);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "RAG");
        assert_eq!(json["answer"], "hi");
        assert_eq!(json["sources"][0], "Policy Text");
        assert!(json["risks"].as_object().unwrap().is_empty());
    }
}
