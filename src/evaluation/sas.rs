//! Semantic Answer Similarity

use std::sync::Arc;

use super::{ensure_same_len, MetricResult};
use crate::{
    error::{RagError, Result},
    services::{embeddings::cosine_similarity, Embedder},
};

/// Cosine similarity between embeddings of predicted and reference answers
pub struct SasEvaluator {
    embedder: Arc<dyn Embedder>,
}

impl SasEvaluator {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] on a length mismatch and embedder
    /// errors unchanged.
    pub async fn run(
        &self,
        predicted_answers: &[String],
        ground_truth_answers: &[String],
    ) -> Result<MetricResult> {
        ensure_same_len(
            "predicted and ground truth answers",
            predicted_answers.len(),
            ground_truth_answers.len(),
        )?;
        if predicted_answers.is_empty() {
            return Ok(MetricResult::from_scores(Vec::new()));
        }

        let predicted = self.embedder.embed(predicted_answers).await?;
        let truth = self.embedder.embed(ground_truth_answers).await?;
        if predicted.len() != predicted_answers.len() || truth.len() != ground_truth_answers.len() {
            return Err(RagError::InvalidResponse {
                provider: self.embedder.model().to_string(),
                message: "embedding count does not match answer count".to_string(),
            });
        }

        let scores = predicted
            .iter()
            .zip(&truth)
            .map(|(p, t)| f64::from(cosine_similarity(p, t)))
            .collect();
        Ok(MetricResult::from_scores(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LetterEmbedder;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_identical_and_disjoint_answers() {
        let evaluator = SasEvaluator::new(Arc::new(LetterEmbedder));
        let result = evaluator
            .run(&strings(&["yes", "abc"]), &strings(&["Yes.", "xyz"]))
            .await
            .unwrap();

        assert!((result.individual_scores[0] - 1.0).abs() < 1e-6);
        assert!(result.individual_scores[1].abs() < 1e-6);
        assert!((result.score - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_length_mismatch() {
        let evaluator = SasEvaluator::new(Arc::new(LetterEmbedder));
        let err = evaluator.run(&strings(&["a"]), &[]).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
    }
}
