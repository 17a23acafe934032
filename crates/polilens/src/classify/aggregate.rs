//! Document-level aggregation of per-chunk classifier scores.
//!
//! Scores are max-pooled per category: one strong signal anywhere in the
//! document surfaces it, no matter how diluted the rest of the text is.
//! The chunk that produced each maximum is kept as evidence for the
//! explanation stage and the end user.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::taxonomy::{self, RiskTier};

/// One chunk with its fixed-size label-probability vector.
#[derive(Debug, Clone)]
pub struct ChunkScores {
    /// Chunk text (kept for evidence tracking)
    pub chunk: String,
    /// Probability per taxonomy index, values in [0, 1]
    pub scores: Vec<f32>,
}

/// Per-document aggregation result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Detected category labels, taxonomy order
    pub labels: Vec<String>,
    /// Pooled maximum score per taxonomy index (all categories)
    pub scores: Vec<f32>,
    /// Risk tier per detected label, parallel to `labels`
    pub risks: Vec<RiskTier>,
    /// Percentage of detected categories per risk tier
    pub risk_percentage: BTreeMap<String, f64>,
    /// Evidence chunk per detected label
    pub relevant_chunks: HashMap<String, String>,
}

/// Max-pool per-chunk score vectors into a document-level result.
///
/// Pooling uses strict greater-than replacement, so for tied maxima the
/// first chunk in document order keeps the evidence slot; identical input
/// ordering always reproduces identical output. Empty input yields an
/// empty result, never an error.
pub fn aggregate(chunk_results: &[ChunkScores]) -> AggregatedResult {
    if chunk_results.is_empty() {
        return AggregatedResult::default();
    }

    let mut pooled = vec![0.0f32; taxonomy::SIZE];
    let mut best_chunks = vec![""; taxonomy::SIZE];

    for result in chunk_results {
        for (i, &score) in result.scores.iter().take(taxonomy::SIZE).enumerate() {
            if score > pooled[i] {
                pooled[i] = score;
                best_chunks[i] = &result.chunk;
            }
        }
    }

    let mut labels = Vec::new();
    let mut risks = Vec::new();
    let mut evidence = HashMap::new();

    for (i, &score) in pooled.iter().enumerate() {
        if score > taxonomy::threshold(i) {
            let label = taxonomy::label(i);
            labels.push(label.to_string());
            risks.push(taxonomy::risk_tier(i));
            evidence.insert(label.to_string(), best_chunks[i].to_string());
        }
    }

    AggregatedResult {
        risk_percentage: risk_summary(&risks),
        labels,
        scores: pooled,
        risks,
        relevant_chunks: evidence,
    }
}

/// Percentage distribution of detected categories over the three risk
/// tiers, rounded to one decimal. With no detected categories every tier
/// reports zero.
pub fn risk_summary(risks: &[RiskTier]) -> BTreeMap<String, f64> {
    let total = risks.len();
    [RiskTier::High, RiskTier::Medium, RiskTier::Low]
        .iter()
        .map(|tier| {
            let pct = if total == 0 {
                0.0
            } else {
                let count = risks.iter().filter(|r| *r == tier).count();
                (count as f64 * 100.0 / total as f64 * 10.0).round() / 10.0
            };
            (tier.as_str().to_string(), pct)
        })
        .collect()
}
