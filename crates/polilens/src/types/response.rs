//! Outbound response types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::classify::AggregatedResult;
use crate::taxonomy::RiskTier;

/// Full analysis result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Detected category labels, taxonomy order
    pub labels: Vec<String>,
    /// Pooled maximum score per taxonomy index
    pub scores: Vec<f32>,
    /// Risk tier per detected label, parallel to `labels`
    pub risks: Vec<RiskTier>,
    /// Percentage of detected categories per risk tier
    pub risk_percentage: BTreeMap<String, f64>,
    /// Evidence chunk per detected label
    pub relevant_chunks: HashMap<String, String>,
    /// Plain-language explanation of the detected practices
    pub explanation: String,
    /// Short document summary
    pub summary: String,
    /// The chunks the document was segmented into, ready to be echoed
    /// back as chat context
    pub chunks: Vec<String>,
    pub chunk_count: usize,
    /// Source URL, absent for pasted text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Resolved model key that produced the scores
    pub model_used: String,
}

impl AnalysisResponse {
    /// Assemble the envelope from the aggregation result and the
    /// generation-stage outputs.
    pub fn assemble(
        aggregated: AggregatedResult,
        explanation: String,
        summary: String,
        chunks: Vec<String>,
        url: Option<String>,
        model_used: String,
    ) -> Self {
        Self {
            labels: aggregated.labels,
            scores: aggregated.scores,
            risks: aggregated.risks,
            risk_percentage: aggregated.risk_percentage,
            relevant_chunks: aggregated.relevant_chunks,
            explanation,
            summary,
            chunk_count: chunks.len(),
            chunks,
            url,
            model_used,
        }
    }
}

/// Registered classifier models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub default: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_omitted_from_json_when_absent() {
        let response = AnalysisResponse::assemble(
            AggregatedResult::default(),
            "explanation".to_string(),
            "summary".to_string(),
            vec!["chunk".to_string()],
            None,
            "deberta-v2".to_string(),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["chunk_count"], 1);
        assert_eq!(json["model_used"], "deberta-v2");
    }
}
