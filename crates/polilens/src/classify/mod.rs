//! Multi-label classification: model adapter and document-level aggregation

mod aggregate;
mod model;

pub use aggregate::{aggregate, risk_summary, AggregatedResult, ChunkScores};
pub use model::{
    resolve_model_key, ChunkClassifier, ClassifierProvider, ModelRegistry, OnnxClassifier,
    AVAILABLE_MODELS, DEFAULT_MODEL,
};

use crate::error::Result;

/// Classify chunks sequentially, pairing each with its score vector.
///
/// Chunk order is preserved; aggregation downstream depends on it for
/// deterministic evidence selection on tied scores.
pub async fn score_chunks(
    classifier: &dyn ChunkClassifier,
    chunks: &[String],
) -> Result<Vec<ChunkScores>> {
    let mut results = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let preview: String = chunk.chars().take(50).collect();
        tracing::debug!(
            chunk = i + 1,
            total = chunks.len(),
            preview = %preview.replace('\n', " "),
            "classifying chunk"
        );
        let scores = classifier.classify(chunk).await?;
        results.push(ChunkScores {
            chunk: chunk.clone(),
            scores,
        });
    }
    Ok(results)
}
