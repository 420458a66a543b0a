//! Document Mean Reciprocal Rank

use super::{ensure_same_len, MetricResult};
use crate::{error::Result, rag::Document};

/// Mean reciprocal rank of the first retrieved document matching a ground-truth document
///
/// Documents match on content.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMrrEvaluator;

impl DocumentMrrEvaluator {
    /// # Errors
    ///
    /// Returns [`crate::RagError::InvalidInput`] if the two lists differ in length.
    pub fn run(
        &self,
        ground_truth_documents: &[Vec<Document>],
        retrieved_documents: &[Vec<Document>],
    ) -> Result<MetricResult> {
        ensure_same_len(
            "ground truth and retrieved documents",
            ground_truth_documents.len(),
            retrieved_documents.len(),
        )?;

        let scores = ground_truth_documents
            .iter()
            .zip(retrieved_documents)
            .map(|(truth, retrieved)| reciprocal_rank(truth, retrieved))
            .collect();

        Ok(MetricResult::from_scores(scores))
    }
}

#[allow(clippy::cast_precision_loss)]
fn reciprocal_rank(truth: &[Document], retrieved: &[Document]) -> f64 {
    retrieved
        .iter()
        .position(|doc| truth.iter().any(|t| t.same_content(doc)))
        .map_or(0.0, |rank| 1.0 / (rank + 1) as f64)
}
